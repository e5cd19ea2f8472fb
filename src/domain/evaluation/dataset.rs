//! Evaluation dataset items

use serde::{Deserialize, Serialize};

/// A question paired with its expected answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationItem {
    pub question: String,
    pub ground_truth: String,
}

impl EvaluationItem {
    pub fn new(question: impl Into<String>, ground_truth: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ground_truth: ground_truth.into(),
        }
    }
}

const BUILT_IN: &[(&str, &str)] = &[
    (
        "How many people were employed in the renewables sector worldwide as of 2020?",
        "As of 2020, renewables employed about 12 million people worldwide, with solar PV being the largest employer with almost 4 million jobs.",
    ),
    (
        "What percentage of energy in the transportation sector comes from renewables?",
        "Less than 4% of transport energy is from renewables.",
    ),
    (
        "Which country accounted for nearly half of the global increase in renewable electricity in 2021?",
        "In 2021, China accounted for almost half of the global increase in renewable electricity.",
    ),
    (
        "What are some examples of how renewable energy is used for heating?",
        "Solar water heating is a major contributor, particularly in China. Heat pumps are also an increasing priority for providing both heating and cooling.",
    ),
    (
        "What is the controversial status of nuclear power?",
        "The provided text does not contain enough information to answer this question in detail, only that it is controversial because it requires mining uranium.",
    ),
    (
        "What is the capital of Australia?",
        "This question is not relevant to the knowledge base on renewable energy.",
    ),
];

/// The built-in renewable-energy dataset, including one out-of-scope question
pub fn default_dataset() -> Vec<EvaluationItem> {
    BUILT_IN
        .iter()
        .map(|(question, ground_truth)| EvaluationItem::new(*question, *ground_truth))
        .collect()
}
