//! alcf_get_system_info - canned overview question for a known system

use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::Deserialize;

use super::{ALCF_GET_SYSTEM_INFO, error_result, success_result};
use crate::orchestrator::QueryOrchestrator;
use crate::query::{OutputFormat, SystemName};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SystemInfoArgs {
    /// ALCF system: Aurora, Polaris, AI Testbed, Cerebras, SambaNova or Groq
    pub system_name: SystemName,
}

pub(crate) async fn execute(orchestrator: &QueryOrchestrator, args: SystemInfoArgs) -> CallToolResult {
    let format = OutputFormat::Document;
    match orchestrator.ask_about_system(args.system_name, format).await {
        Ok(shaped) => success_result(shaped),
        Err(e) => error_result(
            ALCF_GET_SYSTEM_INFO,
            &e,
            &args.system_name.question(),
            format,
        ),
    }
}
