/*!
`list.rs`

Implements the `list` subcommand: enumerate the MCP tools this server registers,
with a compact parameter summary (`*` = required).

Reads the same registration metadata that `serve` publishes, so it never
resolves or spawns gemini.

JSON Output Shape:
{
  "status": "ok",
  "count": 3,
  "tools": [
    { "name": "googleSearch", "description": "...", "params": ["query*:string", ...], "inputSchema": {...} }
  ]
}
*/

use anyhow::Result;
use clap::Args;

use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji, table};
use crate::cmd::shared::{param_summary, registered_tools};

/// CLI arguments for `gemini-mcp list`
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

pub fn execute_list(args: ListArgs) -> Result<()> {
    let tools = registered_tools();
    tracing::debug!(count = tools.len(), "listing registered tools");

    if args.json {
        let items: Vec<_> = tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.get("name").cloned().unwrap_or_default(),
                    "description": t.get("description").cloned().unwrap_or_default(),
                    "params": param_summary(t),
                    "inputSchema": t.get("inputSchema").cloned().unwrap_or_default(),
                })
            })
            .collect();
        let out = serde_json::json!({
            "status": "ok",
            "count": items.len(),
            "tools": items,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    println!(
        "{}",
        box_header(
            format!("{} Tools ({})", emoji("list", &style), tools.len()),
            Some("gemini-mcp"),
            &style,
        )
    );

    let rows: Vec<Vec<String>> = tools
        .iter()
        .enumerate()
        .map(|(idx, t)| {
            let name = t
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("<unnamed>")
                .to_string();
            let params = param_summary(t);
            let desc = t
                .get("description")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .replace('\n', " ");
            let params = if params.is_empty() {
                "-".to_string()
            } else {
                params.join(", ")
            };
            vec![(idx + 1).to_string(), name, params, desc]
        })
        .collect();

    println!(
        "{}",
        table(&["#", "NAME", "PARAMS", "DESCRIPTION"], &rows, &style)
    );
    println!(
        "\n{} {}",
        emoji("info", &style),
        color(
            Role::Dim,
            "Run one locally with `gemini-mcp exec <search|chat|analyze> --param KEY=VALUE`",
            &style
        )
    );
    Ok(())
}
