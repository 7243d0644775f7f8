//! Operation requests and their shaping into `gemini` argument vectors.
//!
//! Each request struct is the single schema definition for its operation: serde
//! drives deserialization of MCP arguments, schemars drives the published
//! input schema, and `shape()` validates before building arguments.

use std::path::Path;

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

use super::error::{GeminiError, Result};

pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg", ".bmp"];
pub const TEXT_EXTENSIONS: &[&str] = &[".txt", ".md", ".text"];
pub const DOCUMENT_EXTENSIONS: &[&str] = &[".pdf"];

/// Flags shared by every operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CommonFlags {
    /// Run gemini in sandbox mode (-s)
    #[serde(default)]
    #[schemars(description = "Run gemini in sandbox mode (-s)")]
    pub sandbox: bool,

    /// Auto-approve all gemini actions (-y)
    #[serde(default)]
    #[schemars(description = "Automatically accept all actions (-y, YOLO mode)")]
    pub yolo: bool,

    /// Model override (-m)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Gemini model to use, e.g. gemini-2.5-flash (-m)")]
    pub model: Option<String>,
}

impl CommonFlags {
    /// Append `-s`, `-y`, `-m <model>` in that order. A blank model is treated as unset.
    fn append_to(&self, args: &mut Vec<String>) {
        if self.sandbox {
            args.push("-s".into());
        }
        if self.yolo {
            args.push("-y".into());
        }
        if let Some(model) = self.model.as_deref().filter(|m| !m.trim().is_empty()) {
            args.push("-m".into());
            args.push(model.to_string());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchRequest {
    #[schemars(description = "The search query")]
    pub query: String,

    #[serde(
        default,
        deserialize_with = "whole_number",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<f64>", description = "Maximum number of results to return")]
    pub limit: Option<u32>,

    #[serde(default)]
    #[schemars(
        description = "Return structured JSON with summary and grounding metadata (sources, search queries)"
    )]
    pub raw: bool,

    #[serde(flatten)]
    pub flags: CommonFlags,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChatRequest {
    #[schemars(description = "The prompt to send to Gemini")]
    pub prompt: String,

    #[serde(flatten)]
    pub flags: CommonFlags,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeFileRequest {
    #[schemars(
        description = "Absolute path of the file to analyze (images, text or PDF). Gemini reads the file itself"
    )]
    pub file_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Additional instructions for the analysis")]
    pub prompt: Option<String>,

    #[serde(flatten)]
    pub flags: CommonFlags,
}

/// A validated, ready-to-run argument vector plus the prompt it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapedCommand {
    pub prompt: String,
    pub args: Vec<String>,
}

impl ShapedCommand {
    fn new(prompt: String, flags: &CommonFlags) -> Self {
        let mut args = vec!["-p".to_string(), prompt.clone()];
        flags.append_to(&mut args);
        Self { prompt, args }
    }
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GeminiError::validation(field, "must be a non-empty string"));
    }
    Ok(())
}

impl SearchRequest {
    pub fn shape(&self) -> Result<ShapedCommand> {
        require("query", &self.query)?;

        let prompt = if self.raw {
            let mut p = raw_search_prompt(&self.query);
            if let Some(limit) = self.limit {
                p.push_str(&format!(" Limit to {limit} sources."));
            }
            p
        } else {
            let mut p = format!("Search for: {}", self.query);
            if let Some(limit) = self.limit {
                p.push_str(&format!(" (return up to {limit} results)"));
            }
            p
        };

        Ok(ShapedCommand::new(prompt, &self.flags))
    }
}

/// Prompt asking for a JSON object keyed by the query with summary + grounding metadata.
fn raw_search_prompt(query: &str) -> String {
    // serde_json quoting keeps the key valid JSON even when the query contains quotes.
    let key = serde_json::to_string(query).unwrap_or_else(|_| format!("\"{query}\""));
    format!(
        r#"Search the web for: {query}

Respond with ONLY a JSON object in exactly this format, with no surrounding text:
{{
  {key}: {{
    "summary": "concise summary of what the search found",
    "groundingMetadata": {{
      "searchQueries": ["search query actually executed"],
      "sources": [
        {{
          "url": "https://source.example",
          "title": "source page title",
          "relevantExcerpts": ["excerpt from the source relevant to the query"]
        }}
      ]
    }}
  }}
}}"#
    )
}

impl ChatRequest {
    pub fn shape(&self) -> Result<ShapedCommand> {
        require("prompt", &self.prompt)?;
        Ok(ShapedCommand::new(self.prompt.clone(), &self.flags))
    }
}

impl AnalyzeFileRequest {
    pub fn shape(&self) -> Result<ShapedCommand> {
        require("filePath", &self.file_path)?;
        check_file_type(&self.file_path)?;

        let mut prompt = format!("Analyze this file: {}", self.file_path);
        if let Some(extra) = self.prompt.as_deref().filter(|p| !p.trim().is_empty()) {
            prompt.push_str("\n\n");
            prompt.push_str(extra);
        }
        Ok(ShapedCommand::new(prompt, &self.flags))
    }
}

/// Accepts any JSON number and keeps its whole part (`5.0` and `5.9` both give 5).
fn whole_number<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let Some(n) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if !n.is_finite() || n < 0.0 || n.trunc() > f64::from(u32::MAX) {
        return Err(D::Error::custom(format!(
            "limit must be a non-negative number, got {n}"
        )));
    }
    Ok(Some(n.trunc() as u32))
}

/// Case-insensitive extension whitelist check. The file itself is never opened.
fn check_file_type(file_path: &str) -> Result<()> {
    let extension = Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();

    let supported = [IMAGE_EXTENSIONS, TEXT_EXTENSIONS, DOCUMENT_EXTENSIONS]
        .iter()
        .any(|group| group.contains(&extension.as_str()));
    if supported {
        return Ok(());
    }

    Err(GeminiError::UnsupportedFileType {
        extension: if extension.is_empty() {
            "(none)".to_string()
        } else {
            extension
        },
        images: IMAGE_EXTENSIONS.join(", "),
        text: TEXT_EXTENSIONS.join(", "),
        documents: DOCUMENT_EXTENSIONS.join(", "),
    })
}

/// Name of each exposed operation as registered over MCP.
pub const SEARCH_TOOL: &str = "googleSearch";
pub const CHAT_TOOL: &str = "chat";
pub const ANALYZE_FILE_TOOL: &str = "analyzeFile";

/// Any one of the three operation requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRequest {
    Search(SearchRequest),
    Chat(ChatRequest),
    AnalyzeFile(AnalyzeFileRequest),
}

impl OperationRequest {
    pub fn tool_name(&self) -> &'static str {
        match self {
            OperationRequest::Search(_) => SEARCH_TOOL,
            OperationRequest::Chat(_) => CHAT_TOOL,
            OperationRequest::AnalyzeFile(_) => ANALYZE_FILE_TOOL,
        }
    }

    pub fn shape(&self) -> Result<ShapedCommand> {
        match self {
            OperationRequest::Search(r) => r.shape(),
            OperationRequest::Chat(r) => r.shape(),
            OperationRequest::AnalyzeFile(r) => r.shape(),
        }
    }
}

impl From<SearchRequest> for OperationRequest {
    fn from(r: SearchRequest) -> Self {
        OperationRequest::Search(r)
    }
}

impl From<ChatRequest> for OperationRequest {
    fn from(r: ChatRequest) -> Self {
        OperationRequest::Chat(r)
    }
}

impl From<AnalyzeFileRequest> for OperationRequest {
    fn from(r: AnalyzeFileRequest) -> Self {
        OperationRequest::AnalyzeFile(r)
    }
}
