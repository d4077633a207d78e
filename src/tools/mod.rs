//! MCP tool implementations

pub(crate) mod ask_question;
pub(crate) mod system_info;

pub use ask_question::AskQuestionArgs;
pub use system_info::SystemInfoArgs;

use rmcp::model::{CallToolResult, Content};
use tracing::warn;

use crate::query::OutputFormat;
use crate::shaper::{ShapedResponse, render_error};
use crate::utils::AskError;

pub const ALCF_ASK_QUESTION: &str = "alcf_ask_question";
pub const ALCF_GET_SYSTEM_INFO: &str = "alcf_get_system_info";

/// Structured answers carry the record as structured content plus its JSON
/// text; documents are a single Markdown block.
fn success_result(shaped: ShapedResponse) -> CallToolResult {
    match shaped.format {
        OutputFormat::Structured => match serde_json::to_value(&shaped.response) {
            Ok(value) => {
                let mut result = CallToolResult::structured(value);
                result.content = vec![Content::text(shaped.body)];
                result
            }
            Err(_) => CallToolResult::success(vec![Content::text(shaped.body)]),
        },
        OutputFormat::Document => CallToolResult::success(vec![Content::text(shaped.body)]),
    }
}

fn error_result(tool: &str, err: &AskError, question: &str, format: OutputFormat) -> CallToolResult {
    warn!("{} failed ({}): {}", tool, err.kind(), err);
    CallToolResult::error(vec![Content::text(render_error(err, question, format))])
}
