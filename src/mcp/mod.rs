//! MCP server exposing the Gemini CLI as tools.
//!
//! GeminiServer -> tool router { googleSearch | chat | analyzeFile }
//! serve_stdio: run the server over stdin/stdout until the client disconnects.
//!
use anyhow::{Context, Result};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo, Tool};
use rmcp::transport::stdio;
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt, tool, tool_handler, tool_router};

use crate::gemini::{
    self, AnalyzeFileRequest, ChatRequest, GeminiCli, GeminiError, OperationRequest,
    SearchRequest,
};

/// The MCP handler. Cheap to clone; holds no per-request state.
#[derive(Clone)]
pub struct GeminiServer {
    cli: GeminiCli,
    tool_router: ToolRouter<Self>,
}

impl GeminiServer {
    pub fn new(cli: GeminiCli) -> Self {
        Self {
            cli,
            tool_router: Self::tool_router(),
        }
    }

    /// Registration metadata for every exposed tool (name, description, input schema).
    pub fn tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    async fn dispatch(
        &self,
        request: impl Into<OperationRequest>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request = request.into();
        let name = request.tool_name();
        to_call_result(name, self.cli.run(request).await)
    }
}

/// Map an operation outcome onto MCP.
///
/// Parameter errors become protocol `invalid_params` errors; resolution and process
/// failures become tool results flagged `is_error` so the caller sees the message.
fn to_call_result(
    tool_name: &str,
    outcome: gemini::Result<String>,
) -> std::result::Result<CallToolResult, McpError> {
    match outcome {
        Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
        Err(e) if e.is_invalid_params() => {
            tracing::debug!(tool = tool_name, error = %e, "rejected parameters");
            Err(McpError::invalid_params(e.to_string(), None))
        }
        Err(e) => {
            tracing::warn!(tool = tool_name, error = %e, "gemini call failed");
            Ok(CallToolResult::error(vec![Content::text(describe_failure(&e))]))
        }
    }
}

fn describe_failure(err: &GeminiError) -> String {
    match err {
        GeminiError::Execution { exit_code, stderr } => {
            format!("gemini exited with code {exit_code}\n\n{stderr}")
        }
        other => other.to_string(),
    }
}

#[tool_router]
impl GeminiServer {
    #[tool(
        name = "googleSearch",
        description = "Search the web with Google Search through the Gemini CLI. Set raw=true for structured JSON with a summary and grounding metadata (search queries, sources, excerpts)."
    )]
    async fn google_search(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<CallToolResult, McpError> {
        self.dispatch(request).await
    }

    #[tool(
        name = "chat",
        description = "Send a prompt to Gemini through the Gemini CLI and return its reply."
    )]
    async fn chat(
        &self,
        Parameters(request): Parameters<ChatRequest>,
    ) -> std::result::Result<CallToolResult, McpError> {
        self.dispatch(request).await
    }

    #[tool(
        name = "analyzeFile",
        description = "Analyze a local file with Gemini. Supported: images (.png .jpg .jpeg .gif .webp .svg .bmp), text (.txt .md .text) and documents (.pdf). Pass an absolute path."
    )]
    async fn analyze_file(
        &self,
        Parameters(request): Parameters<AnalyzeFileRequest>,
    ) -> std::result::Result<CallToolResult, McpError> {
        self.dispatch(request).await
    }
}

#[tool_handler]
impl ServerHandler for GeminiServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Gemini CLI bridge.\n\n\
                 Tools:\n\
                 • googleSearch — web search via Gemini (raw=true for JSON with sources)\n\
                 • chat — free-form prompt to Gemini\n\
                 • analyzeFile — describe or answer questions about an image, text or PDF file\n\n\
                 All tools accept sandbox, yolo and model."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}

/// Serve over stdio until the peer closes the connection.
pub async fn serve_stdio(server: GeminiServer) -> Result<()> {
    let service = server
        .serve(stdio())
        .await
        .context("Failed to start MCP service on stdio")?;
    tracing::info!("serving MCP on stdio");
    service
        .waiting()
        .await
        .context("MCP service terminated abnormally")?;
    tracing::info!("MCP client disconnected");
    Ok(())
}
