//! Process-wide fallback failure handler.
//!
//! The slot is an `ArcSwapOption`: lock-free reads on the failure path,
//! last-write-wins replacement. A routing pass loads the handler once and
//! keeps that reference for its whole duration, so a concurrent replacement
//! only affects failures routed afterwards.

use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwapOption;
use errand_core::ErrorInfo;

use crate::presenter::Presenter;

// ---------------------------------------------------------------------------
// FailureHandler
// ---------------------------------------------------------------------------

/// A failure callback that may be installed as the global default.
///
/// Implemented for every `Fn(&ErrorInfo) + Send + Sync` closure.
pub trait FailureHandler: Send + Sync + 'static {
    fn on_failure(&self, error: &ErrorInfo);
}

impl<F> FailureHandler for F
where
    F: Fn(&ErrorInfo) + Send + Sync + 'static,
{
    fn on_failure(&self, error: &ErrorInfo) {
        self(error);
    }
}

/// Sized wrapper so a trait object can live behind `ArcSwapOption`.
pub struct HandlerRef(Box<dyn FailureHandler>);

impl HandlerRef {
    pub fn handle(&self, error: &ErrorInfo) {
        self.0.on_failure(error);
    }
}

impl std::fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HandlerRef(..)")
    }
}

// ---------------------------------------------------------------------------
// ErrorPolicy
// ---------------------------------------------------------------------------

static GLOBAL: LazyLock<Arc<ErrorPolicy>> = LazyLock::new(|| Arc::new(ErrorPolicy::new()));

/// Holds zero or one default failure handler.
///
/// One instance is process-wide ([`ErrorPolicy::global`]); view models can be
/// built against a private instance instead, which keeps tests isolated.
#[derive(Debug, Default)]
pub struct ErrorPolicy {
    handler: ArcSwapOption<HandlerRef>,
}

impl ErrorPolicy {
    /// Creates an empty policy (no handler installed).
    #[must_use]
    pub fn new() -> Self {
        Self {
            handler: ArcSwapOption::empty(),
        }
    }

    /// Creates a policy whose handler presents `error.display_message()`.
    #[must_use]
    pub fn with_default(presenter: Arc<dyn Presenter>) -> Self {
        let policy = Self::new();
        policy.install_default(presenter);
        policy
    }

    /// The process-wide policy. Starts empty until the bootstrap installs a
    /// handler.
    #[must_use]
    pub fn global() -> Arc<ErrorPolicy> {
        Arc::clone(&GLOBAL)
    }

    /// Replaces the handler. Failures already being routed keep the
    /// reference they loaded.
    pub fn set(&self, handler: impl FailureHandler) {
        self.handler.store(Some(Arc::new(HandlerRef(Box::new(handler)))));
    }

    /// Installs the default handler: surface the message through `presenter`.
    pub fn install_default(&self, presenter: Arc<dyn Presenter>) {
        self.set(move |error: &ErrorInfo| presenter.present(error.display_message()));
    }

    /// Removes the handler; later failures reach local hooks only.
    pub fn clear(&self) {
        self.handler.store(None);
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.handler.load().is_some()
    }

    /// Snapshot of the current handler.
    #[must_use]
    pub fn current(&self) -> Option<Arc<HandlerRef>> {
        self.handler.load_full()
    }

    /// Invokes the current handler, if any. Returns whether one ran.
    ///
    /// The handler is loaded once up front; a replacement installed while it
    /// runs only applies to later calls.
    pub fn notify(&self, error: &ErrorInfo) -> bool {
        match self.current() {
            Some(handler) => {
                handler.handle(error);
                true
            }
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingPresenter {
        shown: Mutex<Vec<String>>,
    }

    impl Presenter for RecordingPresenter {
        fn present(&self, message: &str) {
            self.shown.lock().push(message.to_string());
        }
    }

    #[test]
    fn new_policy_is_empty() {
        let policy = ErrorPolicy::new();
        assert!(!policy.is_set());
        assert!(!policy.notify(&ErrorInfo::network("offline")));
    }

    #[test]
    fn set_then_notify_invokes_handler() {
        let policy = ErrorPolicy::new();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        policy.set(move |_: &ErrorInfo| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(policy.notify(&ErrorInfo::network("offline")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn replacement_is_last_write_wins() {
        let policy = ErrorPolicy::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&log);
        policy.set(move |e: &ErrorInfo| first.lock().push(format!("first:{}", e.message())));
        let second = Arc::clone(&log);
        policy.set(move |e: &ErrorInfo| second.lock().push(format!("second:{}", e.message())));

        policy.notify(&ErrorInfo::business("limit"));
        assert_eq!(*log.lock(), vec!["second:limit"]);
    }

    #[test]
    fn snapshot_survives_replacement() {
        let policy = ErrorPolicy::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let old = Arc::clone(&log);
        policy.set(move |_: &ErrorInfo| old.lock().push("old"));
        let snapshot = policy.current().unwrap();

        let new = Arc::clone(&log);
        policy.set(move |_: &ErrorInfo| new.lock().push("new"));

        snapshot.handle(&ErrorInfo::unknown("x"));
        policy.notify(&ErrorInfo::unknown("y"));
        assert_eq!(*log.lock(), vec!["old", "new"]);
    }

    #[test]
    fn clear_removes_handler() {
        let policy = ErrorPolicy::new();
        policy.set(|_: &ErrorInfo| {});
        policy.clear();
        assert!(!policy.is_set());
    }

    #[test]
    fn default_handler_presents_display_message() {
        let presenter = Arc::new(RecordingPresenter::default());
        let policy = ErrorPolicy::with_default(presenter.clone());

        policy.notify(&ErrorInfo::business("insufficient balance"));
        policy.notify(&ErrorInfo::unknown(""));

        assert_eq!(
            *presenter.shown.lock(),
            vec!["insufficient balance", errand_core::UNKNOWN_ERROR_MESSAGE]
        );
    }

    #[test]
    fn global_returns_shared_arc() {
        assert!(Arc::ptr_eq(&ErrorPolicy::global(), &ErrorPolicy::global()));
    }
}
