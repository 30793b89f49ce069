//! Result container for one orchestrated request.

use crate::error::ErrorInfo;

/// Outcome of a work function: a value or a normalized failure, never both.
///
/// Work functions return `anyhow::Result<Outcome<T>>`: `Ok(Outcome::Failure)`
/// is a business-level failure the work function detected itself, while
/// `Err(_)` is a raised failure that still needs classifying.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    /// The work produced a value.
    Success(T),
    /// The work detected a failure itself and reported it without raising.
    Failure(ErrorInfo),
}

impl<T> Outcome<T> {
    pub fn success(value: T) -> Self {
        Self::Success(value)
    }

    pub fn failure(error: ErrorInfo) -> Self {
        Self::Failure(error)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Borrows the error of a failed outcome.
    #[must_use]
    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Converts into a plain `Result`.
    ///
    /// # Errors
    ///
    /// Returns the contained [`ErrorInfo`] for the `Failure` variant.
    pub fn into_result(self) -> Result<T, ErrorInfo> {
        self.into()
    }
}

impl<T> From<Result<T, ErrorInfo>> for Outcome<T> {
    fn from(result: Result<T, ErrorInfo>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Failure(error),
        }
    }
}

impl<T> From<Outcome<T>> for Result<T, ErrorInfo> {
    fn from(outcome: Outcome<T>) -> Self {
        match outcome {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn success_has_no_error() {
        let outcome = Outcome::success(42);
        assert!(outcome.is_success());
        assert!(outcome.error().is_none());
        assert_eq!(outcome.into_result(), Ok(42));
    }

    #[test]
    fn failure_exposes_error() {
        let outcome: Outcome<u32> = Outcome::failure(ErrorInfo::business("insufficient balance"));
        assert!(outcome.is_failure());
        assert_eq!(outcome.error().map(ErrorInfo::kind), Some(ErrorKind::BusinessRule));
    }

    #[test]
    fn map_keeps_failure_untouched() {
        let failed: Outcome<u32> = Outcome::failure(ErrorInfo::network("offline"));
        let mapped = failed.clone().map(|v| v * 2);
        assert_eq!(mapped.error(), failed.error());

        assert_eq!(Outcome::success(21).map(|v| v * 2), Outcome::Success(42));
    }

    proptest! {
        #[test]
        fn exactly_one_variant_is_populated(
            value in any::<i64>(),
            fail in any::<bool>(),
            msg in ".*"
        ) {
            let outcome = if fail {
                Outcome::failure(ErrorInfo::unknown(msg))
            } else {
                Outcome::success(value)
            };
            prop_assert_ne!(outcome.is_success(), outcome.is_failure());
            prop_assert_eq!(outcome.error().is_some(), fail);
        }
    }
}
