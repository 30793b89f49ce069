//! Task scope: the cancellation domain of a UI-binding entity.
//!
//! Every task spawned on a scope is tracked, runs under a child token of the
//! scope's `CancellationToken`, and has escaping panics caught at the scope
//! boundary. Tasks never own the scope; they only hold tokens.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error};

/// Cancellation domain with in-flight tracking.
///
/// Dropping the scope cancels it, which is how "the owning entity was
/// destroyed" reaches tasks still running on it.
#[derive(Debug)]
pub struct TaskScope {
    name: String,
    token: CancellationToken,
    tracker: TaskTracker,
    /// Number of `wait_for_drain` calls in progress.
    drainers: Mutex<usize>,
}

impl TaskScope {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: CancellationToken::new(),
            tracker: TaskTracker::new(),
            drainers: Mutex::new(0),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A token cancelled when this scope is, and cancellable on its own
    /// without affecting the scope or sibling tasks.
    #[must_use]
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Spawns `fut` on the current tokio runtime as a tracked task.
    ///
    /// A panic inside `fut` is reported here and does not propagate to the
    /// returned handle.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn<F>(&self, fut: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let scope = self.name.clone();
        self.tracker.spawn(async move {
            if let Err(payload) = AssertUnwindSafe(fut).catch_unwind().await {
                let message = errand_core::classify_panic(payload.as_ref());
                error!(scope = %scope, panic = %message.message(), "task panicked");
            }
        })
    }

    /// Cancels every task launched on this scope. Idempotent.
    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            debug!(scope = %self.name, in_flight = self.in_flight(), "scope cancelled");
        }
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Number of tasks spawned on this scope that have not finished.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Waits until every tracked task has finished, up to `timeout`.
    ///
    /// Returns `true` if the scope drained, `false` if the timeout expired.
    /// Concurrent callers are allowed; the scope keeps accepting work
    /// throughout.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let _drain = DrainGuard::enter(self);
        tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok()
    }
}

/// Keeps the tracker closed while at least one drain is waiting.
///
/// `TaskTracker::wait` only resolves once the tracker is closed; the last
/// drainer to leave reopens it, including when its future is dropped.
struct DrainGuard<'a> {
    scope: &'a TaskScope,
}

impl<'a> DrainGuard<'a> {
    fn enter(scope: &'a TaskScope) -> Self {
        let mut drainers = scope.drainers.lock();
        *drainers += 1;
        scope.tracker.close();
        Self { scope }
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        let mut drainers = self.scope.drainers.lock();
        *drainers -= 1;
        if *drainers == 0 {
            self.scope.tracker.reopen();
        }
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
