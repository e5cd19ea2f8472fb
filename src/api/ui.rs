//! Server-rendered question form

use std::fmt::Write as _;

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::Html,
};
use serde::Deserialize;
use tracing::error;

use super::state::AppState;
use super::types::{ApiError, AskResponse};
use crate::domain::{RelevanceScore, RetrievedDocument};

const TITLE: &str = "Asynchronous Q&A Agent for Renewable Energy";
const INTRO: &str = "This agent runs a retrieval-augmented pipeline to answer your questions: \
    it checks the question is on topic, retrieves passages from the knowledge base, \
    answers from those passages and scores its own answer.";
const KNOWLEDGE_BASE_INFO: &str =
    "The knowledge base contains information on renewable energy and its market & trends.";
const PLACEHOLDER: &str = "e.g., What are the market trends for solar energy?";

const STYLE: &str = "body{font-family:sans-serif;max-width:60rem;margin:2rem auto;padding:0 1rem}\
    input[type=text]{width:70%;padding:.4rem}button{padding:.4rem 1rem}\
    .info{background:#e8f1fb;padding:.6rem}.warning{background:#fff4d6;padding:.6rem}\
    .error{background:#fde2e2;padding:.6rem}.answer{white-space:pre-wrap}\
    .metric{font-size:1.6rem;font-weight:bold}pre{white-space:pre-wrap;background:#f6f6f6;padding:.5rem}";

#[derive(Debug, Default, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub user_query: String,
}

/// Empty form
pub async fn index() -> Html<String> {
    Html(render_page("", ""))
}

/// Form submission; upstream failures are rendered, never propagated
pub async fn ask(
    State(state): State<AppState>,
    Form(form): Form<AskForm>,
) -> (StatusCode, Html<String>) {
    let question = form.user_query.trim();

    if question.is_empty() {
        let body = panel("warning", "Please enter a question to get started.");
        return (StatusCode::OK, Html(render_page(question, &body)));
    }

    match state.executor.run(question).await {
        Ok(run) => {
            let body = render_answer(&AskResponse::from(run));
            (StatusCode::OK, Html(render_page(question, &body)))
        }
        Err(e) => {
            error!(error = %e, "Workflow run failed");
            let body = format!(
                "{}{}",
                panel(
                    "error",
                    &format!("An error occurred while running the agent: {}", e)
                ),
                panel("error", "Please check the server logs for more details."),
            );
            let status = ApiError::from(e).status;
            (status, Html(render_page(question, &body)))
        }
    }
}

fn render_page(question: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n\
         <h1>{title}</h1>\n<p>{intro}</p>\n<p class=\"info\">{info}</p>\n\
         <form method=\"post\" action=\"/ask\">\n\
         <label for=\"user_query\">Ask your question:</label><br>\n\
         <input type=\"text\" id=\"user_query\" name=\"user_query\" value=\"{question}\" placeholder=\"{placeholder}\">\n\
         <button type=\"submit\">Get Answer</button>\n</form>\n{body}\n</body>\n</html>\n",
        title = escape_html(TITLE),
        style = STYLE,
        intro = escape_html(INTRO),
        info = escape_html(KNOWLEDGE_BASE_INFO),
        question = escape_html(question),
        placeholder = escape_html(PLACEHOLDER),
        body = body,
    )
}

fn render_answer(response: &AskResponse) -> String {
    let mut html = String::from("<hr>\n<h2>Agent's Answer</h2>\n");
    let _ = writeln!(
        html,
        "<div class=\"answer\">{}</div>",
        escape_html(&response.final_answer)
    );

    // The score is only meaningful once the planner accepted the question
    if response.planner_decision {
        match &response.evaluator_response {
            RelevanceScore::Score(_) => {
                let _ = writeln!(
                    html,
                    "<p>Relevance Score</p>\n<p class=\"metric\">{}</p>",
                    response.evaluator_response
                );
            }
            RelevanceScore::Unparseable(raw) => html.push_str(&panel(
                "warning",
                &format!("Could not parse the evaluation score. Raw output: {}", raw),
            )),
        }
    }

    if let Some(docs) = response.retrieved_docs.as_deref().filter(|d| !d.is_empty()) {
        html.push_str(&render_passages(docs));
    }

    html
}

fn render_passages(docs: &[RetrievedDocument]) -> String {
    let mut html = String::from("<details>\n<summary>Show Retrieved Context</summary>\n");

    for (i, doc) in docs.iter().enumerate() {
        let metadata = serde_json::to_string_pretty(&doc.metadata).unwrap_or_default();
        let _ = writeln!(
            html,
            "<h3>Document {}:</h3>\n<pre>{}</pre>\n<pre class=\"metadata\">{}</pre>",
            i + 1,
            escape_html(&doc.content),
            escape_html(&metadata)
        );
    }

    html.push_str("</details>\n");
    html
}

fn panel(class: &str, message: &str) -> String {
    format!("<p class=\"{}\">{}</p>\n", class, escape_html(message))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
