//! Child process execution for a resolved strategy.

use std::process::Stdio;

use tokio::process::Command;

use super::error::{GeminiError, Result};
use super::resolver::InvocationStrategy;

/// Fully buffered outcome of one child process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ProcessResult {
    /// Stdout on exit code 0, `Execution` error with verbatim stderr otherwise.
    pub fn into_output(self) -> Result<String> {
        if self.exit_code == 0 {
            Ok(self.stdout)
        } else {
            Err(GeminiError::Execution {
                exit_code: self.exit_code,
                stderr: self.stderr,
            })
        }
    }
}

/// Run `strategy.command` with `base_args ++ args`, wait for it and capture both streams.
///
/// No data is written to the child; its stdin is closed at spawn. There is no
/// timeout: a child that never exits keeps this future pending.
pub async fn run(strategy: &InvocationStrategy, args: &[String]) -> Result<ProcessResult> {
    let argv: Vec<&str> = strategy
        .base_args
        .iter()
        .chain(args)
        .map(String::as_str)
        .collect();

    tracing::debug!(
        command = %strategy.command,
        argv = %shell_words::join(&argv),
        "spawning gemini"
    );

    let output = Command::new(&strategy.command)
        .args(&argv)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| GeminiError::Spawn {
            command: strategy.command.clone(),
            source,
        })?;

    // Terminated by signal: no exit code, report as -1.
    let exit_code = output.status.code().unwrap_or(-1);
    tracing::debug!(exit_code, stdout_len = output.stdout.len(), "gemini exited");

    Ok(ProcessResult {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code,
    })
}

/// Run and resolve to stdout text, failing on a non-zero exit.
pub async fn invoke(strategy: &InvocationStrategy, args: &[String]) -> Result<String> {
    run(strategy, args).await?.into_output()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh() -> InvocationStrategy {
        InvocationStrategy {
            command: "sh".into(),
            base_args: vec!["-c".into()],
        }
    }

    fn script(s: &str) -> Vec<String> {
        vec![s.to_string()]
    }

    #[tokio::test]
    async fn success_returns_stdout() {
        let out = invoke(&sh(), &script("printf 'hello world'")).await.unwrap();
        assert_eq!(out, "hello world");
    }

    #[tokio::test]
    async fn base_args_precede_args() {
        let strategy = InvocationStrategy {
            command: "sh".into(),
            base_args: vec!["-c".into(), "printf '%s|%s' \"$0\" \"$1\"".into()],
        };
        let out = invoke(&strategy, &["first".to_string(), "second".to_string()])
            .await
            .unwrap();
        assert_eq!(out, "first|second");
    }

    #[tokio::test]
    async fn nonzero_exit_carries_code_and_exact_stderr() {
        for code in [1, 2, 42] {
            let cmd = format!("printf 'partial'; printf 'boom\\n  line2' >&2; exit {code}");
            let err = invoke(&sh(), &script(&cmd)).await.unwrap_err();
            match err {
                GeminiError::Execution { exit_code, stderr } => {
                    assert_eq!(exit_code, code);
                    assert_eq!(stderr, "boom\n  line2");
                }
                other => panic!("expected Execution, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn stdin_is_closed() {
        // `cat` would block forever on an open stdin.
        let out = invoke(&sh(), &script("cat; printf done")).await.unwrap();
        assert_eq!(out, "done");
    }

    #[tokio::test]
    async fn missing_command_is_spawn_error() {
        let strategy = InvocationStrategy {
            command: "gemini-mcp-definitely-missing-binary".into(),
            base_args: Vec::new(),
        };
        let err = invoke(&strategy, &[]).await.unwrap_err();
        assert!(matches!(err, GeminiError::Spawn { .. }));
    }

    #[tokio::test]
    async fn run_collects_both_streams() {
        let res = run(&sh(), &script("printf out; printf err >&2"))
            .await
            .unwrap();
        assert_eq!(
            res,
            ProcessResult {
                stdout: "out".into(),
                stderr: "err".into(),
                exit_code: 0,
            }
        );
    }
}
