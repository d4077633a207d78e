//! alcf_ask_question - free-form question to the ALCF assistant

use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::Deserialize;

use super::{ALCF_ASK_QUESTION, error_result, success_result};
use crate::orchestrator::QueryOrchestrator;
use crate::query::OutputFormat;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AskQuestionArgs {
    /// Question about ALCF systems, resources, or best practices (5-1000 characters).
    /// Examples: "What is Aurora?", "How do I compile code on Aurora?",
    /// "What are the best practices for running PyTorch on Polaris?"
    pub question: String,

    /// Maximum time to wait for the answer in milliseconds (10000-180000, default 60000)
    #[serde(default, alias = "timeout")]
    pub timeout_ms: Option<u64>,

    /// Output format: "document" (Markdown, default) or "structured" (JSON)
    #[serde(default)]
    pub response_format: OutputFormat,
}

pub(crate) async fn execute(orchestrator: &QueryOrchestrator, args: AskQuestionArgs) -> CallToolResult {
    match orchestrator
        .ask(&args.question, args.timeout_ms, args.response_format)
        .await
    {
        Ok(shaped) => success_result(shaped),
        Err(e) => error_result(ALCF_ASK_QUESTION, &e, args.question.trim(), args.response_format),
    }
}
