use postlens_common::PostlensError;

/// Receives every batch failure the orchestrator observes, whether the
/// failure is about to abort the call or is being skipped.
pub trait FailureLogger: Send + Sync {
    fn log_failure(&self, error: &PostlensError, message: &str);
}

/// Forwards failures to `tracing` at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFailureLogger;

impl FailureLogger for TracingFailureLogger {
    fn log_failure(&self, error: &PostlensError, message: &str) {
        tracing::error!(error = %error, "{message}");
    }
}

/// Discards failures.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFailureLogger;

impl FailureLogger for NoopFailureLogger {
    fn log_failure(&self, _error: &PostlensError, _message: &str) {}
}
