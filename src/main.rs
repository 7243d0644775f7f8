use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod gemini;
mod mcp;
mod utils;

use cmd::{ExecArgs, ListArgs};

/// gemini-mcp - expose the Gemini CLI as MCP tools
///
/// Command layout:
///   gemini-mcp [--allow-npx]                     serve MCP over stdio (default)
///   gemini-mcp serve [--allow-npx]               same, explicit
///   gemini-mcp list [--json]                     show registered tools + parameters
///   gemini-mcp exec <search|chat|analyze> [--param k=v ...] [--param-file f] [--json]
///
/// Global flags / env:
///   -v / -vv              Increase verbosity (logs go to stderr)
///   -q / --quiet          Errors only
///   --allow-npx           Run gemini through npx when it is not installed
///   GEMINI_MCP_ALLOW_NPX  Environment fallback for --allow-npx (1/true/yes/on)
///   RUST_LOG              Overrides the -v/-q derived log filter
///
/// Examples:
///   gemini-mcp --allow-npx
///   gemini-mcp exec search --param query="rust 2024 edition" --param limit=3
///   gemini-mcp exec analyze --param filePath=/tmp/diagram.png --param prompt="Explain it"
#[derive(Parser, Debug)]
#[command(
    name = "gemini-mcp",
    version,
    author,
    about = "gemini-mcp - Gemini CLI search, chat and file analysis over MCP",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Allow running gemini via npx when it is not installed
    #[arg(long = "allow-npx", global = true)]
    allow_npx: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the MCP tools over stdio (default)
    Serve,

    /// List registered tools
    List(ListArgs),

    /// Run one operation locally
    Exec(ExecArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    // CLI flag > GEMINI_MCP_ALLOW_NPX env
    let allow_fallback = cli.allow_npx || utils::env_flag("GEMINI_MCP_ALLOW_NPX");

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => cmd::execute_serve(allow_fallback),
        Commands::List(args) => cmd::execute_list(args),
        Commands::Exec(args) => cmd::execute_exec(args, allow_fallback),
    }
}
