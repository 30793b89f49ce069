//! Client-level configuration.

use std::time::Duration;

/// Configuration consumed by the bootstrap, view models, and the demo CLI.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Verbose logging and pretty output.
    pub debug: bool,
    /// Explicit `EnvFilter` directive. Overrides the debug-derived default.
    pub log_filter: Option<String>,
    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,
    /// Deadline work functions should impose on transport calls.
    pub request_timeout: Duration,
    /// How long `ViewModel::wait_idle` waits for in-flight requests.
    pub drain_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            debug: false,
            log_filter: None,
            json_logs: false,
            request_timeout: Duration::from_secs(20),
            drain_timeout: Duration::from_secs(5),
        }
    }
}

/// Errors from validating a [`ClientConfig`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `request_timeout` was zero.
    #[error("request_timeout must be greater than zero")]
    ZeroRequestTimeout,
    /// `log_filter` is not a valid `EnvFilter` directive.
    #[error("invalid log filter '{filter}': {reason}")]
    InvalidLogFilter { filter: String, reason: String },
}

impl ClientConfig {
    /// Filter directive actually used: the explicit one, else `debug`/`info`.
    #[must_use]
    pub fn effective_log_filter(&self) -> String {
        match &self.log_filter {
            Some(filter) => filter.clone(),
            None if self.debug => "debug".to_string(),
            None => "info".to_string(),
        }
    }

    /// Checks invariants the rest of the client relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroRequestTimeout);
        }
        if let Some(filter) = &self.log_filter {
            tracing_subscriber::EnvFilter::try_new(filter).map_err(|e| {
                ConfigError::InvalidLogFilter {
                    filter: filter.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        Ok(())
    }
}
