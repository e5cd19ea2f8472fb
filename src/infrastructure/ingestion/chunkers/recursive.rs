//! Recursive character splitting

use std::collections::VecDeque;

use tracing::warn;

use crate::domain::ingestion::{Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy};
use crate::domain::DomainError;

/// Paragraphs, then lines, then words, then characters
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// Splits on the coarsest separator present in the text, recursing into any
/// piece still too long, then merges neighbouring pieces into windows of at
/// most `chunk_size` characters that overlap by up to `chunk_overlap`
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    separators: Vec<String>,
}

impl RecursiveChunker {
    pub fn new() -> Self {
        Self::with_separators(DEFAULT_SEPARATORS.iter().copied())
    }

    pub fn with_separators<'a>(separators: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            separators: separators.into_iter().map(str::to_string).collect(),
        }
    }

    fn split_text(&self, text: &str, separators: &[String], config: &ChunkingConfig) -> Vec<String> {
        let (separator, remaining) = pick_separator(text, separators);

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();

        for piece in text.split(separator).filter(|s| !s.is_empty()) {
            if char_len(piece) < config.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(merge_splits(&fitting, separator, config));
                fitting.clear();
            }

            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_text(piece, remaining, config));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(merge_splits(&fitting, separator, config));
        }

        chunks
    }
}

impl Default for RecursiveChunker {
    fn default() -> Self {
        Self::new()
    }
}

/// First separator found in `text` and the finer ones after it
fn pick_separator<'s>(text: &str, separators: &'s [String]) -> (&'s str, &'s [String]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return (separator.as_str(), &[]);
        }
        if text.contains(separator.as_str()) {
            return (separator.as_str(), &separators[i + 1..]);
        }
    }

    (separators.last().map(String::as_str).unwrap_or(""), &[])
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn join(pieces: &VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = pieces.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();

    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Greedily pack pieces into windows, carrying a tail of at most
/// `chunk_overlap` characters into the next window
fn merge_splits(pieces: &[&str], separator: &str, config: &ChunkingConfig) -> Vec<String> {
    let separator_len = char_len(separator);
    let mut chunks = Vec::new();
    let mut window: VecDeque<&str> = VecDeque::new();
    let mut total = 0usize;

    for &piece in pieces {
        let len = char_len(piece);
        let joiner = |window: &VecDeque<&str>| if window.is_empty() { 0 } else { separator_len };

        if total + len + joiner(&window) > config.chunk_size {
            if total > config.chunk_size {
                warn!(
                    size = total,
                    chunk_size = config.chunk_size,
                    "Created a chunk larger than the configured size"
                );
            }

            if !window.is_empty() {
                if let Some(chunk) = join(&window, separator) {
                    chunks.push(chunk);
                }

                while total > config.chunk_overlap
                    || (total > 0 && total + len + joiner(&window) > config.chunk_size)
                {
                    let had_more = window.len() > 1;
                    let Some(first) = window.pop_front() else {
                        break;
                    };
                    total -= char_len(first) + if had_more { separator_len } else { 0 };
                }
            }
        }

        window.push_back(piece);
        total += len + if window.len() > 1 { separator_len } else { 0 };
    }

    if let Some(chunk) = join(&window, separator) {
        chunks.push(chunk);
    }

    chunks
}

impl ChunkingStrategy for RecursiveChunker {
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>, DomainError> {
        config.validate()?;

        if content.trim().is_empty() {
            return Ok(vec![]);
        }

        let texts = self.split_text(content, &self.separators, config);
        let total = texts.len();
        let mut search_from = 0;

        let chunks = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let start = content[search_from..]
                    .find(&text)
                    .map(|offset| search_from + offset)
                    .or_else(|| content.find(&text))
                    .unwrap_or(0);
                search_from = start;

                Chunk::new(text, ChunkMetadata::new(i, total, start))
            })
            .collect();

        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        "recursive"
    }
}
