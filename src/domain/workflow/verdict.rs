//! Planner verdict classification

use serde::{Deserialize, Serialize};

const AFFIRMATIVE: &[&str] = &["true", "yes"];
const NEGATIVE: &[&str] = &["false", "no"];

/// Classification of the planner model's free-text reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerVerdict {
    InDomain,
    OutOfDomain,
    Unrecognized,
}

impl PlannerVerdict {
    /// Classify a reply by its first word
    ///
    /// Surrounding whitespace, quotes, punctuation and markdown emphasis are
    /// stripped and the comparison is case-insensitive, so `"**True**"`,
    /// `"'true'."` and `"Yes, it can"` are all `InDomain`. A reply such as
    /// `"Not true"` starts with a word that is neither token and is
    /// `Unrecognized`.
    pub fn parse(reply: &str) -> Self {
        let first_word = reply
            .split_whitespace()
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
            .find(|word| !word.is_empty())
            .map(str::to_lowercase);

        match first_word.as_deref() {
            Some(word) if AFFIRMATIVE.contains(&word) => Self::InDomain,
            Some(word) if NEGATIVE.contains(&word) => Self::OutOfDomain,
            _ => Self::Unrecognized,
        }
    }
}

/// What to do when the planner reply is neither affirmative nor negative
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnrecognizedVerdictPolicy {
    /// Treat the question as out of scope
    #[default]
    Reject,
    /// Treat the question as in scope
    Accept,
}

impl UnrecognizedVerdictPolicy {
    /// Map a verdict to the planner decision
    pub fn decide(self, verdict: PlannerVerdict) -> bool {
        match verdict {
            PlannerVerdict::InDomain => true,
            PlannerVerdict::OutOfDomain => false,
            PlannerVerdict::Unrecognized => self == Self::Accept,
        }
    }
}
