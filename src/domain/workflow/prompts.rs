//! Fixed prompt templates and canned replies used by the workflow stages

use crate::domain::knowledge_base::RetrievedDocument;

/// Final answer written when the planner rejects a question
pub const NOT_RELEVANT_MESSAGE: &str = "Query is NOT relevant. Ending workflow.";

/// Final answer written when no passages were retrieved, and the refusal the
/// answer prompt asks the model to use
pub const REFUSAL_MESSAGE: &str = "Based on the provided documents, I cannot answer this question.";

/// Separator placed between passages in the answer context
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Default description of what the knowledge base covers
pub const DEFAULT_DOMAIN_DESCRIPTION: &str = "\
- The environmental benefits of renewable energy (e.g., reducing greenhouse gases).
- The market and industrial trends of renewable energy (e.g., investment, trends, job creation).
- The role of renewables in combating climate change.";

pub const PLANNER_PROMPT: &str = r#"
You are an intelligent gatekeeper for a Q&A system.
Your purpose is to determine if a user's question is relevant to the available knowledge base.

The knowledge base contains specific information about:
${var:domain}

Analyze the following user question and decide if it falls within this scope.
For example, questions about solar panels, wind turbines, or energy costs are relevant.
Questions about unrelated topics like cooking recipes, sports, or general history are NOT relevant.

User Question: "${var:query}"

Can this question be answered using the knowledge base described above?
Respond with only the single word 'True' or 'False'.
"#;

pub const ANSWER_PROMPT: &str = r#"
You are a precision Q&A engine. Your sole purpose is to accurately answer the user's question using **only the specific, relevant pieces of information** from the provided context.

**Core Task:**
1.  First, carefully analyze the user's **Question** to understand exactly what is being asked.
2.  Next, scan the entire **Context** to locate the exact sentences or facts that directly address the question.
3.  Finally, construct your **Answer** by synthesizing *only these relevant pieces of information* into a clear and concise response.

**Strict Rules:**
- **DO NOT** summarize the entire context. Your goal is to answer the question, not to provide a general overview of the documents.
- **DO NOT** include information from the context that is interesting but not directly relevant to the question.
- **DO NOT** use any external knowledge. If the answer is not in the context, you MUST state: "Based on the provided documents, I cannot answer this question."
- **DO NOT** add any prefixes like "In the provided context" or "According to the context" to the responses.

---
**Context:**
${var:context}
---
**Question:**
${var:question}
---

**Answer:**
"#;

pub const EVALUATOR_PROMPT: &str = r#"
You are a strict and impartial AI evaluator. Your task is to evaluate the relevance of a given Answer to a specific Question.

You will provide a score from 0 to 100, where 100 represents perfect relevance and 0 represents complete irrelevance.

- A score of 100 means the answer directly and completely addresses the user's question.
- A score of 75 means the answer is highly relevant but might contain minor extra details.
- A score of 50 means the answer is on the same general topic but does not answer the specific question asked.
- A score of 0 means the answer is about a completely different topic.

Analyze the following Question and Answer.

---
**Question:**
${var:question}
---
**Answer:**
${var:answer}
---

Based on your evaluation, provide the relevance score.
**Respond ONLY with an integer between 0 and 100. Do not provide any explanation, text, or justification. Just the number.**
"#;

pub const JUDGE_PROMPT: &str = r#"
You are an expert AI evaluator for a Retrieval-Augmented Generation (RAG) system.
Your task is to evaluate a generated answer based on a user's question and a ground truth answer derived from a specific document.

You will evaluate on two metrics:
1.  **Faithfulness (1-5):** Does the generated answer ONLY contain information present in the ground truth? A score of 5 means it is perfectly faithful. A score of 1 means it contains significant hallucinations or information not supported by the ground truth.
2.  **Relevance (1-5):** Does the generated answer directly address the user's question? A score of 5 is perfectly relevant. A score of 1 is completely irrelevant.

**User Question:**
${var:question}

**Ground Truth Answer:**
${var:ground_truth}

**Generated Answer:**
${var:generated_answer}

Provide your evaluation in a JSON format with the keys "faithfulness", "relevance", and "justification".

**Example Response:**
{
    "faithfulness": 5,
    "relevance": 5,
    "justification": "The answer is both faithful to the ground truth and directly relevant to the user's question."
}
"#;

/// Joins passage contents in retrieval order; metadata is not included
pub fn build_context(documents: &[RetrievedDocument]) -> String {
    documents
        .iter()
        .map(|doc| doc.content.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prompt::PromptTemplate;

    #[test]
    fn test_build_context_preserves_order() {
        let docs = vec![
            RetrievedDocument::new("A"),
            RetrievedDocument::new("B"),
            RetrievedDocument::new("C"),
        ];

        assert_eq!(build_context(&docs), "A\n\n---\n\nB\n\n---\n\nC");
    }

    #[test]
    fn test_build_context_single_and_empty() {
        assert_eq!(build_context(&[RetrievedDocument::new("only")]), "only");
        assert_eq!(build_context(&[]), "");
    }

    #[test]
    fn test_templates_declare_expected_variables() {
        let names = |content: &str| {
            PromptTemplate::parse(content)
                .variables()
                .iter()
                .map(|v| v.name.clone())
                .collect::<Vec<_>>()
        };

        assert_eq!(names(PLANNER_PROMPT), vec!["domain", "query"]);
        assert_eq!(names(ANSWER_PROMPT), vec!["context", "question"]);
        assert_eq!(names(EVALUATOR_PROMPT), vec!["question", "answer"]);
        assert_eq!(
            names(JUDGE_PROMPT),
            vec!["question", "ground_truth", "generated_answer"]
        );
    }

    #[test]
    fn test_answer_prompt_mentions_refusal() {
        assert!(ANSWER_PROMPT.contains(REFUSAL_MESSAGE));
    }
}
