//! Small extension helpers shared by call sites.

use std::fmt::Display;

/// Log-and-discard for fallible side work whose failure should never abort
/// the caller (cache writes, analytics, best-effort cleanup).
pub trait LogOnError<T> {
    /// Returns the value, or logs the error at `warn` under `context` and
    /// returns `None`.
    fn ok_or_log(self, context: &str) -> Option<T>;
}

impl<T, E: Display> LogOnError<T> for Result<T, E> {
    fn ok_or_log(self, context: &str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(context, error = %error, "ignored failure");
                None
            }
        }
    }
}
