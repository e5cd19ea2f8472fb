//! Judge verdicts and parsing of the judge model's reply

use serde::{Deserialize, Serialize};

/// Error recorded when the judge reply is not the expected JSON object
pub const JUDGE_PARSE_ERROR: &str = "Failed to parse judge's JSON response.";

/// Justification recorded for questions the planner rejected
pub const OUT_OF_SCOPE_JUSTIFICATION: &str =
    "Agent correctly decided the question was out of scope.";

const SCORE_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Outcome of judging one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Judgment {
    Scored {
        faithfulness: u8,
        relevance: u8,
        justification: String,
    },
    Failed {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        raw_content: Option<String>,
    },
}

impl Judgment {
    /// Fixed verdict for a correctly rejected question
    pub fn out_of_scope() -> Self {
        Self::Scored {
            faithfulness: 5,
            relevance: 5,
            justification: OUT_OF_SCOPE_JUSTIFICATION.to_string(),
        }
    }

    /// Record for an item whose workflow or judge call failed upstream
    pub fn upstream_error(message: impl Into<String>) -> Self {
        Self::Failed {
            error: message.into(),
            raw_content: None,
        }
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, Self::Scored { .. })
    }

    /// `(faithfulness, relevance)` when scored
    pub fn scores(&self) -> Option<(u8, u8)> {
        match self {
            Self::Scored {
                faithfulness,
                relevance,
                ..
            } => Some((*faithfulness, *relevance)),
            Self::Failed { .. } => None,
        }
    }
}

#[derive(Deserialize)]
struct JudgeReply {
    faithfulness: u8,
    relevance: u8,
    justification: String,
}

/// Slice from the first `{` to the last `}`, dropping prose or code fences
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;

    (start < end).then(|| &text[start..=end])
}

/// Parse the judge reply; anything malformed becomes a `Failed` judgment
/// carrying the raw reply
pub fn parse_judge_response(raw: &str) -> Judgment {
    let parsed = extract_json(raw)
        .and_then(|json| serde_json::from_str::<JudgeReply>(json).ok())
        .filter(|reply| {
            SCORE_RANGE.contains(&reply.faithfulness) && SCORE_RANGE.contains(&reply.relevance)
        });

    match parsed {
        Some(reply) => Judgment::Scored {
            faithfulness: reply.faithfulness,
            relevance: reply.relevance,
            justification: reply.justification,
        },
        None => Judgment::Failed {
            error: JUDGE_PARSE_ERROR.to_string(),
            raw_content: Some(raw.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let raw = r#"{"faithfulness": 4, "relevance": 5, "justification": "Close."}"#;

        assert_eq!(
            parse_judge_response(raw),
            Judgment::Scored {
                faithfulness: 4,
                relevance: 5,
                justification: "Close.".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "Here is my evaluation:\n```json\n{\"faithfulness\": 3, \"relevance\": 2, \"justification\": \"Partial.\"}\n```";

        assert_eq!(parse_judge_response(raw).scores(), Some((3, 2)));
    }

    #[test]
    fn test_parse_malformed() {
        let raw = "I think the answer is great";

        assert_eq!(
            parse_judge_response(raw),
            Judgment::Failed {
                error: JUDGE_PARSE_ERROR.to_string(),
                raw_content: Some(raw.to_string()),
            }
        );
    }

    #[test]
    fn test_parse_missing_key_and_out_of_range() {
        assert!(!parse_judge_response(r#"{"faithfulness": 4}"#).is_scored());
        assert!(
            !parse_judge_response(r#"{"faithfulness": 9, "relevance": 5, "justification": ""}"#)
                .is_scored()
        );
    }

    #[test]
    fn test_extract_json() {
        assert_eq!(extract_json("x {\"a\": 1} y"), Some("{\"a\": 1}"));
        assert_eq!(extract_json("no json"), None);
        assert_eq!(extract_json("} backwards {"), None);
    }

    #[test]
    fn test_serialized_shapes() {
        let scored = serde_json::to_value(Judgment::out_of_scope()).unwrap();
        assert_eq!(scored["faithfulness"], 5);
        assert_eq!(scored["justification"], OUT_OF_SCOPE_JUSTIFICATION);

        let failed = serde_json::to_value(Judgment::upstream_error("timeout")).unwrap();
        assert_eq!(failed, serde_json::json!({"error": "timeout"}));
    }
}
