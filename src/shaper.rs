//! Response Shaper: pure post-processing of extracted answer text

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::query::OutputFormat;
use crate::utils::AskError;
use crate::utils::constants::CHARACTER_LIMIT;

/// Final output of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Response {
    /// The question that was asked
    pub question: String,
    /// The answer, possibly truncated
    pub answer: String,
    /// Origin service of the answer
    pub source: String,
    /// Whether the answer was cut at the character limit
    pub truncated: bool,
}

/// A `Response` plus its rendering in the requested format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapedResponse {
    pub response: Response,
    pub format: OutputFormat,
    pub body: String,
}

pub fn truncation_notice() -> String {
    format!(
        "\n\n[Response truncated at {CHARACTER_LIMIT} characters. The full response was longer.]"
    )
}

/// Cut `text` to the first `CHARACTER_LIMIT` characters. Returns whether it was cut.
fn truncate(text: &str) -> (String, bool) {
    match text.char_indices().nth(CHARACTER_LIMIT) {
        Some((idx, _)) => {
            let mut cut = text[..idx].to_string();
            cut.push_str(&truncation_notice());
            (cut, true)
        }
        None => (text.to_string(), false),
    }
}

/// Turn extracted answer text into the caller's response. `raw` is kept
/// verbatim up to the character limit; only the answer body is ever
/// truncated.
pub fn shape(raw: &str, question: &str, format: OutputFormat, source: &str, source_url: &str) -> ShapedResponse {
    let (answer, truncated) = truncate(raw);
    let response = Response {
        question: question.to_string(),
        answer,
        source: source.to_string(),
        truncated,
    };
    let body = render(&response, format, source_url);
    ShapedResponse {
        response,
        format,
        body,
    }
}

pub fn render(response: &Response, format: OutputFormat, source_url: &str) -> String {
    match format {
        OutputFormat::Structured => serde_json::to_string_pretty(response)
            .unwrap_or_else(|_| json!({ "error": true, "message": "serialization failed" }).to_string()),
        OutputFormat::Document => format!(
            "# ALCF Query Response\n\n\
             **Question:** {}\n\n\
             **Answer:**\n\n{}\n\n\
             *Source: [{}]({})*",
            response.question, response.answer, response.source, source_url
        ),
    }
}

/// Render a classified failure in the same format a success would have used.
pub fn render_error(err: &AskError, question: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Structured => serde_json::to_string_pretty(&json!({
            "error": true,
            "kind": err.kind(),
            "message": err.to_string(),
            "question": question,
        }))
        .unwrap_or_else(|_| err.to_string()),
        OutputFormat::Document => format!("# Error\n\n{err}"),
    }
}
