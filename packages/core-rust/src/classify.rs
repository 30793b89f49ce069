//! Failure classification: raw `anyhow::Error` -> [`ErrorInfo`].
//!
//! Pure functions, no state. The cause chain is walked outermost first and
//! the first recognised shape wins, so a `Cancelled` wrapped in context is
//! still a cancellation.

use std::any::Any;
use std::error::Error as StdError;
use std::io;

use crate::error::{BusinessError, Cancelled, ErrorInfo, ErrorKind, TransportError};

/// Classify a raised failure into the normalized taxonomy.
///
/// Unrecognised failures become [`ErrorKind::Unknown`] with the outermost
/// message preserved and the full chain kept as `detail`.
#[must_use]
pub fn classify(error: &anyhow::Error) -> ErrorInfo {
    error
        .chain()
        .find_map(classify_known)
        .unwrap_or_else(|| {
            ErrorInfo::unknown(error.to_string()).with_detail(format!("{error:#}"))
        })
}

/// Classify the payload of a caught panic. Always [`ErrorKind::Unknown`].
#[must_use]
pub fn classify_panic(payload: &(dyn Any + Send)) -> ErrorInfo {
    let text = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "task panicked".to_string());
    ErrorInfo::unknown(text.clone()).with_detail(format!("panic: {text}"))
}

fn classify_known(cause: &(dyn StdError + 'static)) -> Option<ErrorInfo> {
    if let Some(info) = cause.downcast_ref::<ErrorInfo>() {
        return Some(info.clone());
    }
    if cause.is::<Cancelled>() {
        return Some(ErrorInfo::cancelled());
    }
    if let Some(business) = cause.downcast_ref::<BusinessError>() {
        return Some(ErrorInfo::business(business.message.clone()));
    }
    if let Some(transport) = cause.downcast_ref::<TransportError>() {
        return Some(classify_transport(transport));
    }
    if let Some(io_err) = cause.downcast_ref::<io::Error>() {
        return is_connectivity(io_err.kind()).then(|| ErrorInfo::network(io_err.to_string()));
    }
    None
}

fn classify_transport(error: &TransportError) -> ErrorInfo {
    let kind = match error {
        TransportError::Connect(_)
        | TransportError::Timeout { .. }
        | TransportError::Status { .. } => ErrorKind::Network,
        TransportError::Decode(_) => ErrorKind::Unknown,
    };
    let info = ErrorInfo::new(kind, error.to_string());
    if kind == ErrorKind::Unknown {
        info.with_detail(format!("{error:?}"))
    } else {
        info
    }
}

fn is_connectivity(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::TimedOut
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
