/*!
Operation enum for the `exec` subcommand.

Variants map one-to-one onto the MCP tools:
  search  -> googleSearch
  chat    -> chat
  analyze -> analyzeFile

Helpers:
  - tool_name()
  - parse_request() (JSON arguments -> typed OperationRequest)
*/

use std::fmt;

use anyhow::{Context, Result};

use crate::gemini::{
    ANALYZE_FILE_TOOL, AnalyzeFileRequest, CHAT_TOOL, ChatRequest, OperationRequest, SEARCH_TOOL,
    SearchRequest,
};

#[derive(clap::ValueEnum, Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Operation {
    /// Web search (googleSearch)
    Search,
    /// Free-form prompt (chat)
    Chat,
    /// File analysis (analyzeFile)
    Analyze,
}

impl Operation {
    /// Name of the MCP tool backing this operation.
    pub fn tool_name(&self) -> &'static str {
        match self {
            Operation::Search => SEARCH_TOOL,
            Operation::Chat => CHAT_TOOL,
            Operation::Analyze => ANALYZE_FILE_TOOL,
        }
    }

    /// Deserialize an MCP-style argument object into the typed request.
    pub fn parse_request(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Result<OperationRequest> {
        let value = serde_json::Value::Object(arguments);
        let request = match self {
            Operation::Search => serde_json::from_value::<SearchRequest>(value)
                .map(OperationRequest::from),
            Operation::Chat => {
                serde_json::from_value::<ChatRequest>(value).map(OperationRequest::from)
            }
            Operation::Analyze => serde_json::from_value::<AnalyzeFileRequest>(value)
                .map(OperationRequest::from),
        };
        request.with_context(|| format!("invalid arguments for {}", self.tool_name()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Search => "search",
            Operation::Chat => "chat",
            Operation::Analyze => "analyze",
        };
        f.write_str(s)
    }
}

/* --------------------------------- Tests ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::Operation;
    use crate::gemini::OperationRequest;
    use serde_json::json;

    #[test]
    fn clap_value_names() {
        use clap::ValueEnum;
        let names: Vec<_> = Operation::value_variants()
            .iter()
            .map(|o| (o.to_string(), o.tool_name()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("search".to_string(), "googleSearch"),
                ("chat".to_string(), "chat"),
                ("analyze".to_string(), "analyzeFile"),
            ]
        );
        assert_eq!(Operation::from_str("ANALYZE", true), Ok(Operation::Analyze));
    }

    #[test]
    fn display_output() {
        assert_eq!(Operation::Analyze.to_string(), "analyze");
    }

    #[test]
    fn parse_request_typed() {
        let args = json!({"filePath": "/tmp/a.png", "prompt": "what is this"})
            .as_object()
            .cloned()
            .unwrap();
        match Operation::Analyze.parse_request(args).unwrap() {
            OperationRequest::AnalyzeFile(r) => {
                assert_eq!(r.file_path, "/tmp/a.png");
                assert_eq!(r.prompt.as_deref(), Some("what is this"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parse_request_type_mismatch() {
        let args = json!({"query": "q", "limit": "many"})
            .as_object()
            .cloned()
            .unwrap();
        let err = Operation::Search.parse_request(args).unwrap_err();
        assert!(err.to_string().contains("googleSearch"));
    }
}
