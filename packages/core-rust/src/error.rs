//! Normalized error taxonomy and the raw failure shapes the classifier knows.
//!
//! Every failure that reaches a failure handler is an [`ErrorInfo`]. Raw
//! failures raised by work functions ([`Cancelled`], [`TransportError`],
//! [`BusinessError`], or anything else carried in an `anyhow::Error`) are
//! turned into one by [`crate::classify`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fallback text shown when a failure carries no message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

// ---------------------------------------------------------------------------
// ErrorKind / ErrorInfo
// ---------------------------------------------------------------------------

/// Category of a normalized failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Connectivity, timeout, or non-success transport status.
    Network,
    /// The remote side rejected the request on business grounds.
    BusinessRule,
    /// The task's scope was torn down. Never reported to failure handlers.
    Cancellation,
    /// Anything the classifier does not recognise.
    Unknown,
}

impl ErrorKind {
    /// Stable lowercase label, used in log fields and metric labels.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::BusinessRule => "business_rule",
            Self::Cancellation => "cancellation",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure: a kind plus a human-readable message.
///
/// Immutable once created. `detail` holds raw diagnostic text (the full
/// cause chain) when the classifier could not map the failure to a known
/// shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ErrorInfo {
    kind: ErrorKind,
    message: String,
    detail: Option<String>,
}

impl ErrorInfo {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    #[must_use]
    pub fn business(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BusinessRule, message)
    }

    #[must_use]
    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancellation, Cancelled.to_string())
    }

    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    /// Attaches raw diagnostic text.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        self.kind == ErrorKind::Cancellation
    }

    /// Text suitable for a toast: the message, or [`UNKNOWN_ERROR_MESSAGE`]
    /// when the message is blank.
    #[must_use]
    pub fn display_message(&self) -> &str {
        if self.message.trim().is_empty() {
            UNKNOWN_ERROR_MESSAGE
        } else {
            &self.message
        }
    }
}

// ---------------------------------------------------------------------------
// Raw failure shapes
// ---------------------------------------------------------------------------

/// Raised when the scope owning a task has been cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("request cancelled")]
pub struct Cancelled;

/// Transport-level failures a work function may raise.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("unable to reach server: {0}")]
    Connect(String),
    /// No response arrived before the deadline.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    /// The server answered with a non-success status.
    #[error("server responded with status {code}")]
    Status { code: u16 },
    /// The response body could not be decoded. Classified as unknown, not
    /// network: the server was reached.
    #[error("malformed response: {0}")]
    Decode(String),
}

/// A server-side business-rule rejection (e.g. a non-zero result code).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct BusinessError {
    /// Server result code, when the backend supplies one.
    pub code: Option<i64>,
    pub message: String,
}

impl BusinessError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }
}
