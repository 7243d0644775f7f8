//! Gemini CLI bridge: resolve -> shape -> invoke.
//!
//! resolver : InvocationStrategy (installed binary vs npx fallback)
//! request  : per-operation schemas + argument shaping
//! invoker  : child process run with full output capture
//!
//! [`GeminiCli`] composes the three per call. Nothing is cached between calls.

pub mod error;
pub mod invoker;
pub mod request;
pub mod resolver;

pub use error::{GeminiError, Result};
pub use request::{
    ANALYZE_FILE_TOOL, AnalyzeFileRequest, CHAT_TOOL, ChatRequest, OperationRequest,
    SEARCH_TOOL, SearchRequest,
};
pub use resolver::{InvocationStrategy, Probe, SystemProbe};

/// Front controller for the three operations.
#[derive(Debug, Clone)]
pub struct GeminiCli<P = SystemProbe> {
    probe: P,
    allow_fallback: bool,
}

impl GeminiCli<SystemProbe> {
    pub fn new(allow_fallback: bool) -> Self {
        Self::with_probe(SystemProbe, allow_fallback)
    }
}

impl<P: Probe> GeminiCli<P> {
    pub fn with_probe(probe: P, allow_fallback: bool) -> Self {
        Self {
            probe,
            allow_fallback,
        }
    }

    /// Resolve the invocation strategy against the current host environment.
    pub async fn resolve(&self) -> Result<InvocationStrategy> {
        resolver::resolve(&self.probe, self.allow_fallback).await
    }

    /// Validate and shape the request, then resolve and run gemini.
    ///
    /// Shaping happens first so invalid parameters never start a process.
    pub async fn run(&self, request: impl Into<OperationRequest>) -> Result<String> {
        let request = request.into();
        let shaped = request.shape()?;
        let strategy = self.resolve().await?;
        tracing::info!(
            operation = request.tool_name(),
            strategy = %strategy,
            "invoking gemini"
        );
        if strategy.is_fallback() {
            tracing::debug!("running through npx; the first call may download the package");
        }
        invoker::invoke(&strategy, &shaped.args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingProbe {
        calls: AtomicUsize,
    }

    impl Probe for CountingProbe {
        async fn locate(&self, _program: &str) -> io::Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }
    }

    #[tokio::test]
    async fn validation_failure_never_probes() {
        let cli = GeminiCli::with_probe(CountingProbe::default(), true);
        let err = cli.run(ChatRequest::default()).await.unwrap_err();
        assert!(err.is_invalid_params());
        assert_eq!(cli.probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unsupported_file_never_probes() {
        let cli = GeminiCli::with_probe(CountingProbe::default(), true);
        let err = cli
            .run(AnalyzeFileRequest {
                file_path: "/tmp/x.exe".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GeminiError::UnsupportedFileType { .. }));
        assert_eq!(cli.probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn each_call_resolves_again() {
        let cli = GeminiCli::with_probe(CountingProbe::default(), false);
        for _ in 0..2 {
            let err = cli
                .run(ChatRequest {
                    prompt: "hi".into(),
                    ..Default::default()
                })
                .await
                .unwrap_err();
            assert!(matches!(err, GeminiError::NotFound(_)));
        }
        assert_eq!(cli.probe.calls.load(Ordering::SeqCst), 2);
    }
}
