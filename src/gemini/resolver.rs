//! Executable resolution: installed `gemini` binary vs `npx` fallback.
//!
//! resolve(probe, allow_fallback) -> InvocationStrategy
//! The host lookup sits behind [`Probe`] so tests never touch PATH.

use std::fmt;
use std::future::Future;
use std::io;
use std::process::Stdio;

use tokio::process::Command;

use super::error::{GeminiError, Result};

/// Executable name of the Gemini CLI.
pub const GEMINI_COMMAND: &str = "gemini";

/// Package runner used when the CLI is not installed.
pub const FALLBACK_RUNNER: &str = "npx";

/// Package locator handed to the runner.
pub const FALLBACK_PACKAGE: &str = "https://github.com/google-gemini/gemini-cli";

/// Platform command used to look up executables on PATH.
#[cfg(windows)]
pub const LOCATOR: &str = "where";
#[cfg(not(windows))]
pub const LOCATOR: &str = "which";

/// How to launch the external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationStrategy {
    pub command: String,
    pub base_args: Vec<String>,
}

impl InvocationStrategy {
    pub fn direct() -> Self {
        Self {
            command: GEMINI_COMMAND.to_string(),
            base_args: Vec::new(),
        }
    }

    pub fn fallback() -> Self {
        Self {
            command: FALLBACK_RUNNER.to_string(),
            base_args: vec![FALLBACK_PACKAGE.to_string()],
        }
    }

    pub fn is_fallback(&self) -> bool {
        !self.base_args.is_empty()
    }
}

impl fmt::Display for InvocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.base_args.is_empty() {
            write!(f, "direct: {}", self.command)
        } else {
            write!(f, "fallback: {} {}", self.command, self.base_args.join(" "))
        }
    }
}

/// Host lookup primitive.
///
/// `Ok(true)` when the program is on PATH, `Ok(false)` when the lookup ran and
/// reported it missing, `Err` when the lookup itself could not be started.
pub trait Probe: Send + Sync {
    fn locate(&self, program: &str) -> impl Future<Output = io::Result<bool>> + Send;
}

/// Runs `which <program>` (or `where` on Windows) and checks the exit status.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl Probe for SystemProbe {
    async fn locate(&self, program: &str) -> io::Result<bool> {
        let status = Command::new(LOCATOR)
            .arg(program)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;
        Ok(status.success())
    }
}

/// Decide which strategy reaches the Gemini CLI.
///
/// A successful probe always yields the direct strategy, whatever `allow_fallback` says.
pub async fn resolve<P: Probe>(probe: &P, allow_fallback: bool) -> Result<InvocationStrategy> {
    let found = probe
        .locate(GEMINI_COMMAND)
        .await
        .map_err(|source| GeminiError::Probe {
            program: GEMINI_COMMAND,
            locator: LOCATOR,
            source,
        })?;

    if found {
        tracing::debug!(command = GEMINI_COMMAND, "found gemini on PATH");
        return Ok(InvocationStrategy::direct());
    }

    if allow_fallback {
        tracing::debug!(
            runner = FALLBACK_RUNNER,
            package = FALLBACK_PACKAGE,
            "gemini not on PATH, using npx fallback"
        );
        return Ok(InvocationStrategy::fallback());
    }

    Err(GeminiError::NotFound(format!(
        "'{GEMINI_COMMAND}' command not found on PATH. Install the Gemini CLI \
         (npm install -g @google/gemini-cli) or start the server with --allow-npx \
         to run it through npx."
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeProbe(io::Result<bool>);

    impl Probe for FakeProbe {
        async fn locate(&self, program: &str) -> io::Result<bool> {
            assert_eq!(program, GEMINI_COMMAND);
            match &self.0 {
                Ok(found) => Ok(*found),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn found_binary_is_direct_regardless_of_fallback() {
        for allow in [false, true] {
            let strategy = resolve(&FakeProbe(Ok(true)), allow).await.unwrap();
            assert_eq!(strategy, InvocationStrategy::direct());
            assert!(strategy.base_args.is_empty());
            assert!(!strategy.is_fallback());
        }
    }

    #[tokio::test]
    async fn missing_binary_without_fallback_is_not_found() {
        let err = resolve(&FakeProbe(Ok(false)), false).await.unwrap_err();
        assert!(matches!(err, GeminiError::NotFound(_)));
        assert!(err.to_string().contains("--allow-npx"));
    }

    #[tokio::test]
    async fn missing_binary_with_fallback_uses_npx() {
        let strategy = resolve(&FakeProbe(Ok(false)), true).await.unwrap();
        assert_eq!(strategy.command, "npx");
        assert_eq!(strategy.base_args, vec![FALLBACK_PACKAGE.to_string()]);
        assert!(strategy.is_fallback());
    }

    #[tokio::test]
    async fn probe_spawn_failure_is_probe_error() {
        let probe = FakeProbe(Err(io::Error::new(io::ErrorKind::NotFound, "no which")));
        let err = resolve(&probe, true).await.unwrap_err();
        assert!(matches!(err, GeminiError::Probe { .. }));
    }

    #[test]
    fn display_strategy() {
        assert_eq!(InvocationStrategy::direct().to_string(), "direct: gemini");
        assert_eq!(
            InvocationStrategy::fallback().to_string(),
            format!("fallback: npx {FALLBACK_PACKAGE}")
        );
    }
}
