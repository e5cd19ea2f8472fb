//! Relevance score produced by the evaluator stage

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-?\b\d+(?:\.\d+)?\b").expect("number pattern is a valid regex")
});

/// Highest score the evaluator may assign
pub const MAX_SCORE: u8 = 100;

/// Evaluator output: a score in `0..=100` or the raw text the model sent instead
///
/// Serialized untagged, so a score is a JSON number and an unparseable reply
/// is the raw JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelevanceScore {
    Score(u8),
    Unparseable(String),
}

impl RelevanceScore {
    /// Score written by the short-circuit paths
    pub fn zero() -> Self {
        Self::Score(0)
    }

    /// Best-effort extraction of a bounded integer from free model text
    ///
    /// A reply that is exactly an integer wins; otherwise the first standalone
    /// number in the text is used. Decimals, values outside `0..=100` and replies
    /// with no number at all are `Unparseable`, keeping the trimmed raw text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        let candidate = trimmed
            .parse::<i64>()
            .ok()
            .or_else(|| {
                // "0.85" must not read as 0
                FIRST_NUMBER
                    .find(trimmed)
                    .and_then(|m| m.as_str().parse::<i64>().ok())
            });

        match candidate {
            Some(value) if (0..=MAX_SCORE as i64).contains(&value) => Self::Score(value as u8),
            _ => Self::Unparseable(trimmed.to_string()),
        }
    }

    pub fn value(&self) -> Option<u8> {
        match self {
            Self::Score(value) => Some(*value),
            Self::Unparseable(_) => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Score(_))
    }
}

impl fmt::Display for RelevanceScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Score(value) => write!(f, "{}/{}", value, MAX_SCORE),
            Self::Unparseable(raw) => write!(f, "unparseable ({:?})", raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_integer() {
        assert_eq!(RelevanceScore::parse("85"), RelevanceScore::Score(85));
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(RelevanceScore::parse("  85\n"), RelevanceScore::Score(85));
    }

    #[test]
    fn test_integer_inside_text() {
        assert_eq!(RelevanceScore::parse("Score: 90/100"), RelevanceScore::Score(90));
    }

    #[test]
    fn test_bounds() {
        assert_eq!(RelevanceScore::parse("0"), RelevanceScore::Score(0));
        assert_eq!(RelevanceScore::parse("100"), RelevanceScore::Score(100));
        assert_eq!(
            RelevanceScore::parse("150"),
            RelevanceScore::Unparseable("150".to_string())
        );
        assert_eq!(
            RelevanceScore::parse("-5"),
            RelevanceScore::Unparseable("-5".to_string())
        );
    }

    #[test]
    fn test_decimal_is_unparseable() {
        assert_eq!(
            RelevanceScore::parse("0.85"),
            RelevanceScore::Unparseable("0.85".to_string())
        );
        assert_eq!(
            RelevanceScore::parse("Relevance: 7.5 out of 10"),
            RelevanceScore::Unparseable("Relevance: 7.5 out of 10".to_string())
        );
    }

    #[test]
    fn test_trailing_period_is_not_a_decimal() {
        assert_eq!(RelevanceScore::parse("Score: 85."), RelevanceScore::Score(85));
    }

    #[test]
    fn test_no_integer() {
        assert_eq!(
            RelevanceScore::parse("highly relevant"),
            RelevanceScore::Unparseable("highly relevant".to_string())
        );
        assert_eq!(RelevanceScore::parse(""), RelevanceScore::Unparseable(String::new()));
    }

    #[test]
    fn test_huge_number_is_unparseable() {
        let raw = "99999999999999999999999";
        assert_eq!(RelevanceScore::parse(raw), RelevanceScore::Unparseable(raw.to_string()));
    }

    #[test]
    fn test_serialization_is_untagged() {
        assert_eq!(serde_json::to_string(&RelevanceScore::Score(75)).unwrap(), "75");
        assert_eq!(
            serde_json::to_string(&RelevanceScore::Unparseable("n/a".into())).unwrap(),
            "\"n/a\""
        );

        let back: RelevanceScore = serde_json::from_str("75").unwrap();
        assert_eq!(back, RelevanceScore::Score(75));
    }

    #[test]
    fn test_display() {
        assert_eq!(RelevanceScore::Score(75).to_string(), "75/100");
        assert_eq!(RelevanceScore::zero().value(), Some(0));
    }
}
