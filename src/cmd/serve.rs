/*!
`serve.rs`

Runs the MCP server over stdio (the default when no subcommand is given).

Startup:
  1. Resolve the gemini invocation strategy once, before registering any tool.
  2. If gemini is missing and --allow-npx is off, print a diagnostic to stderr
     and exit with status 1.
  3. Otherwise register googleSearch / chat / analyzeFile and serve until the
     client disconnects. Every tool call resolves again on its own.
*/

use anyhow::{Context, Result};

use crate::gemini::{self, GeminiCli, GeminiError, InvocationStrategy, Probe};
use crate::mcp::{self, GeminiServer};

pub fn execute_serve(allow_fallback: bool) -> Result<()> {
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let cli = GeminiCli::new(allow_fallback);

    match rt.block_on(startup_check(&cli)) {
        Ok(_) => {}
        Err(e @ GeminiError::NotFound(_)) => {
            eprintln!("{}", startup_diagnostic(&e));
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to resolve the gemini CLI"),
    }

    let server = GeminiServer::new(cli);
    tracing::info!(
        tools = server.tools().len(),
        allow_npx = allow_fallback,
        "starting gemini MCP server"
    );
    rt.block_on(mcp::serve_stdio(server))
}

/// Resolve once before any tool is registered.
async fn startup_check<P: Probe>(cli: &GeminiCli<P>) -> gemini::Result<InvocationStrategy> {
    let strategy = cli.resolve().await?;
    tracing::info!(strategy = %strategy, "gemini CLI resolved");
    Ok(strategy)
}

fn startup_diagnostic(err: &GeminiError) -> String {
    format!("gemini-mcp: {err}")
}
