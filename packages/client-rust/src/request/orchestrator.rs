//! Request lifecycle state machine.
//!
//! `prepare` runs synchronously inside `Request::run` and builds the
//! [`Finalizer`] before anything is spawned, so completion and loading
//! release happen even if the task is dropped without ever being polled.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use errand_core::{classify, classify_panic, ErrorInfo, Outcome};
use futures_util::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, field, info, info_span, warn, Instrument};

use super::{
    routing, CompleteHook, FailHook, Request, RequestContext, RequestId, StartHook, SuccessHook,
    WorkFn,
};
use crate::loading::{LoadingController, LoadingHandle};
use crate::policy::ErrorPolicy;

// ---------------------------------------------------------------------------
// Settlement
// ---------------------------------------------------------------------------

/// How the start hook and work function ended.
#[derive(Debug)]
enum Settlement<T> {
    Succeeded(T),
    Failed(ErrorInfo),
    Cancelled,
    /// No work function was supplied.
    Skipped,
}

impl<T> Settlement<T> {
    fn from_error(error: ErrorInfo) -> Self {
        if error.is_cancellation() {
            Self::Cancelled
        } else {
            Self::Failed(error)
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Succeeded(_) => "success",
            Self::Failed(_) => "failure",
            Self::Cancelled => "cancelled",
            Self::Skipped => "skipped",
        }
    }
}

// ---------------------------------------------------------------------------
// Finalizer
// ---------------------------------------------------------------------------

/// Runs the completion hook, then releases the loading handle, exactly once.
///
/// Called explicitly on the normal path; `Drop` covers hook panics and a
/// task dropped mid-flight.
struct Finalizer {
    id: RequestId,
    complete: Option<CompleteHook>,
    loading: Option<(Arc<LoadingController>, LoadingHandle)>,
}

impl Finalizer {
    fn finish(&mut self) {
        if let Some(complete) = self.complete.take() {
            complete();
        }
        self.release();
    }

    fn release(&mut self) {
        if let Some((controller, handle)) = self.loading.take() {
            controller.release(&handle);
        }
    }
}

impl Drop for Finalizer {
    fn drop(&mut self) {
        if std::thread::panicking() {
            // A second panic while unwinding would abort the process.
            if let Some(complete) = self.complete.take() {
                if catch_unwind(AssertUnwindSafe(complete)).is_err() {
                    error!(request_id = self.id.0, "completion hook panicked during unwind");
                }
            }
            self.release();
        } else {
            self.finish();
        }
    }
}

// ---------------------------------------------------------------------------
// RequestTask
// ---------------------------------------------------------------------------

pub(crate) struct RequestTask<T> {
    id: RequestId,
    token: CancellationToken,
    policy: Arc<ErrorPolicy>,
    start: Option<StartHook>,
    work: Option<WorkFn<T>>,
    success: Option<SuccessHook<T>>,
    fail: Option<FailHook>,
    loading: bool,
    cancelable: bool,
    finalizer: Finalizer,
}

impl<T: Send + 'static> RequestTask<T> {
    /// Acquires the loading handle (unless the scope is already gone) and
    /// arms the finalizer.
    pub(crate) fn prepare(
        request: Request<T>,
        id: RequestId,
        token: CancellationToken,
        controller: &Arc<LoadingController>,
        policy: &Arc<ErrorPolicy>,
    ) -> Self {
        let Request {
            start,
            work,
            success,
            fail,
            complete,
            loading,
            cancelable,
        } = request;

        let handle = (loading && !token.is_cancelled()).then(|| {
            (
                Arc::clone(controller),
                controller.acquire(cancelable, token.clone()),
            )
        });

        Self {
            id,
            token,
            policy: Arc::clone(policy),
            start,
            work,
            success,
            fail,
            loading,
            cancelable,
            finalizer: Finalizer {
                id,
                complete,
                loading: handle,
            },
        }
    }

    pub(crate) async fn drive(self) {
        let span = info_span!(
            "request",
            request_id = self.id.0,
            loading = self.loading,
            cancelable = self.cancelable,
            outcome = field::Empty,
            duration_ms = field::Empty,
        );
        self.drive_inner().instrument(span).await;
    }

    async fn drive_inner(mut self) {
        let started = Instant::now();
        let settlement = self.settle().await;

        let outcome = settlement.label();
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        let span = tracing::Span::current();
        span.record("outcome", outcome);
        span.record("duration_ms", elapsed_ms);
        metrics::counter!("errand_requests_total", "outcome" => outcome).increment(1);
        metrics::histogram!("errand_request_duration_ms").record(elapsed_ms);
        info!(outcome, duration_ms = elapsed_ms, "request complete");

        self.dispatch(settlement);
        self.finalizer.finish();
    }

    /// Start hook and work function. Never fires outcome hooks.
    async fn settle(&mut self) -> Settlement<T> {
        if self.token.is_cancelled() {
            return Settlement::Cancelled;
        }

        if let Some(start) = self.start.take() {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(start)) {
                let error = classify_panic(payload.as_ref());
                warn!(error = %error, "start hook panicked");
                return Settlement::from_error(error);
            }
        }

        let Some(work) = self.work.take() else {
            return Settlement::Skipped;
        };
        let ctx = RequestContext {
            id: self.id,
            token: self.token.clone(),
        };
        let fut = match catch_unwind(AssertUnwindSafe(move || work(ctx))) {
            Ok(fut) => fut,
            Err(payload) => return Settlement::from_error(classify_panic(payload.as_ref())),
        };

        let result = tokio::select! {
            biased;
            () = self.token.cancelled() => return Settlement::Cancelled,
            result = AssertUnwindSafe(fut).catch_unwind() => result,
        };

        // Cancelled while the result was being produced: discard it.
        if self.token.is_cancelled() {
            return Settlement::Cancelled;
        }

        match result {
            Ok(Ok(Outcome::Success(value))) => Settlement::Succeeded(value),
            Ok(Ok(Outcome::Failure(error))) => Settlement::from_error(error),
            Ok(Err(raised)) => {
                let error = classify(&raised);
                if error.is_cancellation() {
                    debug!("work raised cancellation");
                } else {
                    warn!(kind = %error.kind(), error = %raised, "request failed");
                }
                Settlement::from_error(error)
            }
            Err(payload) => {
                let error = classify_panic(payload.as_ref());
                warn!(error = %error, "work function panicked");
                Settlement::from_error(error)
            }
        }
    }

    /// Fires at most one of the success hook or the failure path.
    fn dispatch(&mut self, settlement: Settlement<T>) {
        match settlement {
            Settlement::Succeeded(value) => {
                if let Some(hook) = self.success.take() {
                    hook(value);
                }
            }
            Settlement::Failed(error) => routing::route(&self.policy, self.fail.take(), error),
            Settlement::Cancelled => debug!("request cancelled, outcome hooks suppressed"),
            Settlement::Skipped => debug!("request had no work function"),
        }
    }
}
