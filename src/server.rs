//! MCP server exposing the ALCF tools over stdio

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServiceExt,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::stdio,
};
use tracing::info;

use crate::orchestrator::QueryOrchestrator;
use crate::tools::{self, AskQuestionArgs, SystemInfoArgs};

#[derive(Clone)]
pub struct AlcfServer {
    orchestrator: Arc<QueryOrchestrator>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl AlcfServer {
    pub fn new(orchestrator: Arc<QueryOrchestrator>) -> Self {
        Self {
            orchestrator,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "alcf_ask_question",
        description = "Ask the ALCF AI assistant (ask.alcf.anl.gov) a question about ALCF systems, \
                       resources, allocations, software, or best practices. Opens a fresh headless \
                       browser session per question, waits for the assistant to finish generating, \
                       and returns the answer as Markdown (default) or JSON. Answers longer than \
                       25000 characters are truncated with a notice.",
        annotations(
            title = "Ask ALCF Question",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn ask_question(
        &self,
        Parameters(args): Parameters<AskQuestionArgs>,
    ) -> Result<CallToolResult, McpError> {
        Ok(tools::ask_question::execute(&self.orchestrator, args).await)
    }

    #[tool(
        name = "alcf_get_system_info",
        description = "Get an overview of a specific ALCF system (Aurora, Polaris, AI Testbed, \
                       Cerebras, SambaNova, Groq): key specifications, architecture, and \
                       capabilities. Returns a Markdown document.",
        annotations(
            title = "Get ALCF System Information",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn get_system_info(
        &self,
        Parameters(args): Parameters<SystemInfoArgs>,
    ) -> Result<CallToolResult, McpError> {
        Ok(tools::system_info::execute(&self.orchestrator, args).await)
    }
}

#[tool_handler]
impl rmcp::ServerHandler for AlcfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Answers questions about Argonne Leadership Computing Facility systems by asking \
                 the ALCF AI assistant. Each call drives a real browser and can take up to the \
                 requested timeout; failures are reported as ValidationError, ConnectionError, \
                 TimeoutError, PageStructureError or UnknownError."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}

impl AlcfServer {
    /// Serve on stdin/stdout until the client disconnects.
    pub async fn serve_stdio(self) -> anyhow::Result<()> {
        info!("Starting ALCF MCP server on stdio");
        let running = self.serve(stdio()).await?;
        running.waiting().await?;
        info!("MCP client disconnected");
        Ok(())
    }
}
