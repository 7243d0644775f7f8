/*!
shared.rs - shared helpers for subcommands.

Focus:
  - registered_tools: MCP tool metadata as JSON (same source the server publishes)
  - find_tool / input_schema / param_summary
  - build_arguments_from_schema + primitive coercion
  - load_param_file_into_map (JSON / YAML)
*/

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::gemini::GeminiCli;
use crate::mcp::GeminiServer;

/* ---- Tool Metadata ---- */

/// Registered tools serialized as JSON objects (`name`, `description`, `inputSchema`).
pub fn registered_tools() -> Vec<Value> {
    // Listing metadata never resolves or spawns anything.
    let server = GeminiServer::new(GeminiCli::new(false));
    serde_json::to_value(server.tools())
        .ok()
        .and_then(|v| v.as_array().cloned())
        .unwrap_or_default()
}

/// Find a tool by exact name.
pub fn find_tool<'a>(tools: &'a [Value], name: &str) -> Option<&'a Value> {
    tools
        .iter()
        .find(|t| t.get("name").and_then(|v| v.as_str()) == Some(name))
}

/// Input schema object of a tool JSON value.
pub fn input_schema(tool: &Value) -> Option<&Map<String, Value>> {
    tool.get("inputSchema").and_then(|v| v.as_object())
}

fn required_set(schema: &Map<String, Value>) -> HashSet<&str> {
    schema
        .get("required")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|x| x.as_str()).collect())
        .unwrap_or_default()
}

/// Primitive type of a schema property. `["integer", "null"]` (optional) yields `integer`.
pub fn property_type(prop: &Value) -> &str {
    match prop.get("type") {
        Some(Value::String(s)) => s.as_str(),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(|t| t.as_str())
            .find(|t| *t != "null")
            .unwrap_or("string"),
        _ => "string",
    }
}

/// "name*:type" pairs (`*` marks required) for compact display.
pub fn param_summary(tool: &Value) -> Vec<String> {
    let Some(schema) = input_schema(tool) else {
        return Vec::new();
    };
    let required = required_set(schema);
    schema
        .get("properties")
        .and_then(|v| v.as_object())
        .map(|props| {
            props
                .iter()
                .map(|(name, prop)| {
                    let mark = if required.contains(name.as_str()) { "*" } else { "" };
                    format!("{name}{mark}:{}", property_type(prop))
                })
                .collect()
        })
        .unwrap_or_default()
}

/* ---- Argument Building ---- */

/// Build a JSON arguments object from raw string values using a tool input schema.
///
/// - Each known property is coerced per its declared type (integer | number | boolean | string).
/// - A missing required property is an error.
/// - Keys not declared in the schema are rejected (they would be silently dropped otherwise).
pub fn build_arguments_from_schema(
    schema: &Map<String, Value>,
    provided: &HashMap<String, String>,
) -> Result<Map<String, Value>> {
    let required = required_set(schema);
    let props = schema
        .get("properties")
        .and_then(|v| v.as_object())
        .cloned()
        .unwrap_or_default();

    let mut result = Map::new();
    let mut remaining = provided.clone();

    for (pname, pobj) in &props {
        if let Some(raw) = remaining.remove(pname) {
            result.insert(pname.clone(), coerce_value(&raw, property_type(pobj)));
        } else if required.contains(pname.as_str()) {
            anyhow::bail!("missing required parameter: {pname}");
        }
    }

    if !remaining.is_empty() {
        let mut unknown: Vec<_> = remaining.into_keys().collect();
        unknown.sort();
        let known: Vec<_> = props.keys().map(String::as_str).collect();
        anyhow::bail!(
            "unknown parameter(s): {} (accepted: {})",
            unknown.join(", "),
            known.join(", ")
        );
    }

    Ok(result)
}

/// Coerce a raw string into a JSON value using a primitive type hint.
/// Unparseable values stay strings so deserialization reports the mismatch.
pub fn coerce_value(raw: &str, type_hint: &str) -> Value {
    match type_hint {
        "integer" => raw
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        "number" => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        "boolean" => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => Value::Bool(true),
            "false" | "0" | "no" | "n" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        _ => Value::String(raw.to_string()),
    }
}

/// Parse repeatable `KEY=VALUE` pairs.
pub fn parse_param_pairs(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut provided = HashMap::new();
    for kv in pairs {
        let Some((k, v)) = kv.split_once('=') else {
            anyhow::bail!("invalid --param (expected KEY=VALUE): {kv}");
        };
        let key = k.trim();
        if key.is_empty() {
            anyhow::bail!("invalid --param (empty key): {kv}");
        }
        provided.insert(key.to_string(), v.to_string());
    }
    Ok(provided)
}

/// Merge a JSON or YAML object file into `provided`. Existing keys (CLI) win.
pub fn load_param_file_into_map(path: &str, provided: &mut HashMap<String, String>) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read param file: {path}"))?;
    let lower = path.to_ascii_lowercase();

    let value: Value = if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&raw).context("failed to parse YAML param file")?;
        serde_json::to_value(yaml).context("failed to convert YAML to JSON")?
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON param file")?
    };

    let obj = value
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("param file root must be an object"))?;

    for (k, v) in obj {
        if provided.contains_key(k) {
            continue;
        }
        let s = match v {
            Value::String(sv) => sv.clone(),
            other => other.to_string(),
        };
        provided.insert(k.clone(), s);
    }
    Ok(())
}

/* ---- Tests ---- */
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search_schema() -> Map<String, Value> {
        let tools = registered_tools();
        let tool = find_tool(&tools, "googleSearch").expect("googleSearch registered");
        input_schema(tool).cloned().expect("schema present")
    }

    #[test]
    fn coerce_primitives() {
        assert_eq!(coerce_value("42", "integer"), json!(42));
        assert_eq!(coerce_value("x42", "integer"), json!("x42"));
        assert_eq!(coerce_value("1.5", "number"), json!(1.5));
        assert_eq!(coerce_value("Yes", "boolean"), json!(true));
        assert_eq!(coerce_value("no", "boolean"), json!(false));
        assert_eq!(coerce_value("maybe", "boolean"), json!("maybe"));
    }

    #[test]
    fn property_type_handles_nullable() {
        assert_eq!(property_type(&json!({"type": ["integer", "null"]})), "integer");
        assert_eq!(property_type(&json!({"type": "boolean"})), "boolean");
        assert_eq!(property_type(&json!({})), "string");
    }

    #[test]
    fn build_search_arguments() {
        let mut provided = HashMap::new();
        provided.insert("query".into(), "cats".into());
        provided.insert("limit".into(), "5".into());
        provided.insert("raw".into(), "true".into());
        let args = build_arguments_from_schema(&search_schema(), &provided).unwrap();
        assert_eq!(args.get("query"), Some(&json!("cats")));
        assert_eq!(args.get("limit"), Some(&json!(5.0)));
        assert_eq!(args.get("raw"), Some(&json!(true)));
    }

    #[test]
    fn build_arguments_missing_required() {
        let err = build_arguments_from_schema(&search_schema(), &HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("missing required parameter: query"));
    }

    #[test]
    fn build_arguments_unknown_key() {
        let mut provided = HashMap::new();
        provided.insert("query".into(), "cats".into());
        provided.insert("colour".into(), "red".into());
        let err = build_arguments_from_schema(&search_schema(), &provided).unwrap_err();
        assert!(err.to_string().contains("unknown parameter(s): colour"));
    }

    #[test]
    fn summary_marks_required() {
        let tools = registered_tools();
        let chat = find_tool(&tools, "chat").unwrap();
        let summary = param_summary(chat);
        assert!(summary.contains(&"prompt*:string".to_string()));
        assert!(summary.contains(&"yolo:boolean".to_string()));
    }

    #[test]
    fn param_pairs() {
        let pairs = vec!["query=a=b".to_string(), " limit =3".to_string()];
        let map = parse_param_pairs(&pairs).unwrap();
        assert_eq!(map.get("query").map(String::as_str), Some("a=b"));
        assert_eq!(map.get("limit").map(String::as_str), Some("3"));
        assert!(parse_param_pairs(&["novalue".to_string()]).is_err());
        assert!(parse_param_pairs(&["=x".to_string()]).is_err());
    }

    #[test]
    fn param_file_json_merge() {
        let path = std::env::temp_dir().join("gemini_mcp_param_test.json");
        std::fs::write(&path, r#"{ "query": "from file", "limit": 2 }"#).unwrap();
        let mut provided = HashMap::new();
        provided.insert("query".into(), "override".into());
        load_param_file_into_map(path.to_str().unwrap(), &mut provided).unwrap();
        assert_eq!(provided.get("query").unwrap(), "override");
        assert_eq!(provided.get("limit").unwrap(), "2");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn param_file_yaml() {
        let path = std::env::temp_dir().join("gemini_mcp_param_test.yaml");
        std::fs::write(&path, "prompt: hello\nsandbox: true\n").unwrap();
        let mut provided = HashMap::new();
        load_param_file_into_map(path.to_str().unwrap(), &mut provided).unwrap();
        assert_eq!(provided.get("prompt").unwrap(), "hello");
        assert_eq!(provided.get("sandbox").unwrap(), "true");
        let _ = std::fs::remove_file(path);
    }
}
