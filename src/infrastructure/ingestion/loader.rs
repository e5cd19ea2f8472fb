//! Source file loading

use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use tracing::debug;

use crate::domain::DomainError;

/// A text file read from the data directory
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

impl SourceFile {
    /// Path as stored in passage metadata
    pub fn source(&self) -> String {
        self.path.display().to_string()
    }
}

/// Read every `*.txt` file directly inside `dir`, sorted by path
pub async fn load_text_files(dir: impl AsRef<Path>) -> Result<Vec<SourceFile>, DomainError> {
    let dir = dir.as_ref();

    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        DomainError::not_found(format!("Cannot read data directory {}: {}", dir.display(), e))
    })?;

    let mut paths = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list {}: {}", dir.display(), e)))?
    {
        let path = entry.path();
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);

        if is_file && path.extension().is_some_and(|ext| ext == "txt") {
            paths.push(path);
        }
    }
    paths.sort();

    let files = try_join_all(paths.into_iter().map(read_source)).await?;

    Ok(files)
}

async fn read_source(path: PathBuf) -> Result<SourceFile, DomainError> {
    let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
        DomainError::storage(format!("Failed to read {}: {}", path.display(), e))
    })?;

    debug!(path = %path.display(), bytes = content.len(), "Loaded source file");
    Ok(SourceFile { path, content })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loads_only_top_level_txt_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "second").unwrap();
        std::fs::write(dir.path().join("a.txt"), "first").unwrap();
        std::fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.txt"), "ignored").unwrap();

        let files = load_text_files(dir.path()).await.unwrap();

        let contents: Vec<_> = files.iter().map(|f| f.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
        assert!(files[0].source().ends_with("a.txt"));
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();

        assert!(load_text_files(dir.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();

        let result = load_text_files(dir.path().join("missing")).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }
}
