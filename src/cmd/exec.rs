/*!
`exec.rs`

Implements the `exec` subcommand: run one Gemini operation locally, without an
MCP client, through the same resolve -> shape -> invoke path the server uses.

Parameter injection:
  --param KEY=VALUE                (repeatable; MCP parameter names, e.g. filePath)
  --param-file params.(json|yaml)  (merged; CLI --param overrides file entries)

Values are coerced with the operation's published input schema, then
deserialized into the typed request.

JSON Success Output:
{
  "status": "ok",
  "operation": "googleSearch",
  "elapsed_ms": 1234,
  "arguments": { ... },
  "output": "gemini stdout"
}

JSON Error Output:
{
  "status": "error",
  "operation": "googleSearch",
  "error": "message"
}
*/

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value};

use super::operation::Operation;
use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji, table};
use crate::cmd::shared::{
    build_arguments_from_schema, find_tool, input_schema, load_param_file_into_map,
    parse_param_pairs, registered_tools,
};
use crate::gemini::GeminiCli;

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Operation to run
    pub operation: Operation,

    /// Provide parameter (KEY=VALUE), repeatable
    #[arg(long = "param", short = 'p', value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Load parameters from file (JSON or YAML). CLI --param overrides file entries
    #[arg(long = "param-file", value_name = "PATH")]
    pub param_file: Option<String>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute_exec(args: ExecArgs, allow_fallback: bool) -> Result<()> {
    let tool_name = args.operation.tool_name();

    let arguments = match collect_arguments(&args) {
        Ok(a) => a,
        Err(e) => return output_error(args.json, tool_name, &format!("{e:#}")),
    };

    let request = match args.operation.parse_request(arguments.clone()) {
        Ok(r) => r,
        Err(e) => return output_error(args.json, tool_name, &format!("{e:#}")),
    };

    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let cli = GeminiCli::new(allow_fallback);

    let started = Instant::now();
    let result = rt.block_on(cli.run(request));
    let elapsed_ms = started.elapsed().as_millis();

    let output = match result {
        Ok(o) => o,
        Err(e) => return output_error(args.json, tool_name, &e.to_string()),
    };

    if args.json {
        let out = serde_json::json!({
            "status": "ok",
            "operation": tool_name,
            "elapsed_ms": elapsed_ms,
            "arguments": arguments,
            "output": output,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    let subtitle = format!("{elapsed_ms} ms");
    println!(
        "{}",
        box_header(
            format!("{} {tool_name}", emoji("success", &style)),
            Some(subtitle.as_str()),
            &style,
        )
    );

    if !arguments.is_empty() {
        let mut rows: Vec<Vec<String>> = arguments
            .iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                vec![k.clone(), v]
            })
            .collect();
        rows.sort_by(|a, b| a[0].cmp(&b[0]));
        println!("{}", color(Role::Accent, "Arguments:", &style));
        println!("{}\n", table(&["NAME", "VALUE"], &rows, &style));
    }

    println!("{}", output.trim_end());
    Ok(())
}

/// Merge `--param` and `--param-file`, then coerce against the tool input schema.
fn collect_arguments(args: &ExecArgs) -> Result<Map<String, Value>> {
    let mut provided = parse_param_pairs(&args.params)?;
    if let Some(path) = &args.param_file {
        load_param_file_into_map(path, &mut provided)?;
    }

    let tools = registered_tools();
    let tool_name = args.operation.tool_name();
    let schema = find_tool(&tools, tool_name)
        .and_then(input_schema)
        .with_context(|| format!("no input schema registered for {tool_name}"))?;

    build_arguments_from_schema(schema, &provided)
}

fn error_payload(operation: &str, msg: &str) -> Value {
    serde_json::json!({"status": "error", "operation": operation, "error": msg})
}

fn output_error(json: bool, operation: &str, msg: &str) -> Result<()> {
    if json {
        let err = error_payload(operation, msg);
        println!(
            "{}",
            serde_json::to_string_pretty(&err).unwrap_or_else(|_| err.to_string())
        );
    } else {
        let style = StyleOptions::detect();
        let title = format!("{} {operation} failed", emoji("error", &style));
        println!("{}", box_header(title, None, &style));
        println!("{}", color(Role::Error, msg, &style));
    }
    anyhow::bail!(msg.to_string())
}
