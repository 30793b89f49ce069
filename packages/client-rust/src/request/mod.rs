//! Declarative request builder.
//!
//! A [`Request`] accumulates lifecycle hooks and flags, then [`Request::run`]
//! hands it by value to the orchestrator, which schedules one task on the
//! owning [`ViewModel`]'s scope:
//!
//! 1. acquire a loading handle (if `loading`)
//! 2. start hook
//! 3. work function, raced against cancellation
//! 4. success hook, or two-tier failure routing (nothing if cancelled)
//! 5. completion hook, then loading release -- on every exit path

pub(crate) mod orchestrator;
pub(crate) mod routing;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use errand_core::{ErrorInfo, Outcome};
use futures_util::future::BoxFuture;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::view_model::ViewModel;

pub(crate) type StartHook = Box<dyn FnOnce() + Send>;
pub(crate) type WorkFn<T> =
    Box<dyn FnOnce(RequestContext) -> BoxFuture<'static, anyhow::Result<Outcome<T>>> + Send>;
pub(crate) type SuccessHook<T> = Box<dyn FnOnce(T) + Send>;
pub(crate) type FailHook = Box<dyn FnOnce(ErrorInfo) + Send>;
pub(crate) type CompleteHook = Box<dyn FnOnce() + Send>;

// ---------------------------------------------------------------------------
// RequestId / RequestContext
// ---------------------------------------------------------------------------

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of one `run` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl RequestId {
    fn next() -> Self {
        Self(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Handed to the work function so it can cooperate with cancellation at
/// its own suspension points.
#[derive(Debug, Clone)]
pub struct RequestContext {
    id: RequestId,
    token: CancellationToken,
}

impl RequestContext {
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the request (or its whole scope) is cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Accumulated description of one request.
///
/// Defaults: loading indicator shown, and cancelable by the user.
pub struct Request<T> {
    pub(crate) start: Option<StartHook>,
    pub(crate) work: Option<WorkFn<T>>,
    pub(crate) success: Option<SuccessHook<T>>,
    pub(crate) fail: Option<FailHook>,
    pub(crate) complete: Option<CompleteHook>,
    pub(crate) loading: bool,
    pub(crate) cancelable: bool,
}

impl<T: Send + 'static> Request<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: None,
            work: None,
            success: None,
            fail: None,
            complete: None,
            loading: true,
            cancelable: true,
        }
    }

    /// Runs before the work function, on the request's task.
    pub fn on_start(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.start = Some(Box::new(hook));
        self
    }

    /// The unit of asynchronous work. `Ok(Outcome::Failure)` is a business
    /// failure; `Err` is a raised failure that gets classified.
    pub fn on_request<F, Fut>(mut self, work: F) -> Self
    where
        F: FnOnce(RequestContext) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<Outcome<T>>> + Send + 'static,
    {
        self.work = Some(Box::new(move |ctx| Box::pin(work(ctx))));
        self
    }

    pub fn on_success(mut self, hook: impl FnOnce(T) + Send + 'static) -> Self {
        self.success = Some(Box::new(hook));
        self
    }

    /// Local failure hook. Runs after the global policy's handler.
    pub fn on_fail(mut self, hook: impl FnOnce(ErrorInfo) + Send + 'static) -> Self {
        self.fail = Some(Box::new(hook));
        self
    }

    /// Runs exactly once, whatever the outcome, before the loading
    /// indicator is released.
    pub fn on_complete(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.complete = Some(Box::new(hook));
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    /// Schedules the request on `owner`'s scope.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn run(self, owner: &ViewModel) -> RequestHandle {
        let id = RequestId::next();
        let token = owner.scope().child_token();
        let task = orchestrator::RequestTask::prepare(
            self,
            id,
            token.clone(),
            owner.loading(),
            owner.policy(),
        );
        let join = owner.scope().spawn(task.drive());
        RequestHandle { id, token, join }
    }
}

impl<T: Send + 'static> Default for Request<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Request<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("has_work", &self.work.is_some())
            .field("loading", &self.loading)
            .field("cancelable", &self.cancelable)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// RequestHandle
// ---------------------------------------------------------------------------

/// Handle to a scheduled request.
#[derive(Debug)]
pub struct RequestHandle {
    id: RequestId,
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl RequestHandle {
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Cancels this request only; siblings on the same scope are untouched.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the request's task, including its completion hook.
    ///
    /// # Errors
    ///
    /// Returns the `JoinError` if the runtime dropped the task before it
    /// finished. Hook panics are reported by the scope, not here.
    pub async fn join(self) -> Result<(), JoinError> {
        self.join.await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
