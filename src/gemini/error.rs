//! Error kinds surfaced by the resolver, shaper and invoker.

use std::io;

use thiserror::Error;

/// Result alias for Gemini CLI operations.
pub type Result<T> = std::result::Result<T, GeminiError>;

#[derive(Error, Debug)]
pub enum GeminiError {
    /// A required parameter is missing or malformed. No process was spawned.
    #[error("invalid parameter '{field}': {reason}")]
    Validation { field: &'static str, reason: String },

    /// `analyzeFile` was given a path whose extension is not whitelisted.
    #[error(
        "Unsupported file type: {extension}. Supported types: images ({images}), text ({text}), documents ({documents})"
    )]
    UnsupportedFileType {
        extension: String,
        images: String,
        text: String,
        documents: String,
    },

    /// The `gemini` executable is not on PATH and the npx fallback is disabled.
    #[error("{0}")]
    NotFound(String),

    /// The host could not start the `which`/`where` probe.
    #[error("failed to probe for '{program}' using '{locator}': {source}")]
    Probe {
        program: &'static str,
        locator: &'static str,
        #[source]
        source: io::Error,
    },

    /// The resolved command could not be started.
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The child ran and exited non-zero. `stderr` is the verbatim error stream.
    #[error("gemini exited with code {exit_code}: {stderr}")]
    Execution { exit_code: i32, stderr: String },
}

impl GeminiError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        GeminiError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's parameters (rejected before any spawn).
    pub fn is_invalid_params(&self) -> bool {
        matches!(
            self,
            GeminiError::Validation { .. } | GeminiError::UnsupportedFileType { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_names_field() {
        let err = GeminiError::validation("query", "must not be empty");
        assert_eq!(
            err.to_string(),
            "invalid parameter 'query': must not be empty"
        );
        assert!(err.is_invalid_params());
    }

    #[test]
    fn execution_carries_code_and_stderr() {
        let err = GeminiError::Execution {
            exit_code: 3,
            stderr: "quota exceeded".into(),
        };
        assert_eq!(err.to_string(), "gemini exited with code 3: quota exceeded");
        assert!(!err.is_invalid_params());
    }
}
