//! Loading controller: one busy indicator per UI-binding entity.
//!
//! State machine per handle: Shown -> Released. A newer `acquire` replaces the
//! controller's "current" association without hiding anything; only
//! releasing (or user-dismissing) the current handle hides the indicator.
//!
//! Every `show`/`hide` call is made while the association lock is held, so
//! the widget's visibility always matches the last association change.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

// ---------------------------------------------------------------------------
// LoadingIndicator
// ---------------------------------------------------------------------------

/// The busy widget a controller drives.
///
/// Called with the controller's lock held: implementations must not call
/// back into the [`LoadingController`].
pub trait LoadingIndicator: Send + Sync {
    /// Show the indicator. `cancelable` tells the widget whether a user
    /// dismissal gesture should be offered.
    fn show(&self, cancelable: bool);

    fn hide(&self);
}

/// Indicator for headless entities.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopIndicator;

impl LoadingIndicator for NoopIndicator {
    fn show(&self, _cancelable: bool) {}

    fn hide(&self) {}
}

// ---------------------------------------------------------------------------
// LoadingHandle
// ---------------------------------------------------------------------------

// Process-wide so a handle from another controller never matches.
static NEXT_LOADING_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of one acquired indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadingId(pub u64);

/// Token for one visible busy indicator.
///
/// Releasing it more than once is a no-op.
#[derive(Debug)]
pub struct LoadingHandle {
    id: LoadingId,
    cancelable: bool,
    released: AtomicBool,
}

impl LoadingHandle {
    #[must_use]
    pub fn id(&self) -> LoadingId {
        self.id
    }

    #[must_use]
    pub fn is_cancelable(&self) -> bool {
        self.cancelable
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

struct Current {
    id: LoadingId,
    cancelable: bool,
    token: CancellationToken,
}

// ---------------------------------------------------------------------------
// LoadingController
// ---------------------------------------------------------------------------

/// Shows and hides a [`LoadingIndicator`] on behalf of requests.
pub struct LoadingController {
    indicator: Arc<dyn LoadingIndicator>,
    current: Mutex<Option<Current>>,
}

impl LoadingController {
    #[must_use]
    pub fn new(indicator: Arc<dyn LoadingIndicator>) -> Self {
        Self {
            indicator,
            current: Mutex::new(None),
        }
    }

    /// Shows the indicator and makes the new handle current.
    ///
    /// `token` is cancelled if the user dismisses a cancelable indicator
    /// while this handle is current.
    pub fn acquire(&self, cancelable: bool, token: CancellationToken) -> LoadingHandle {
        let id = LoadingId(NEXT_LOADING_ID.fetch_add(1, Ordering::Relaxed));
        let mut current = self.current.lock();
        if let Some(previous) = current.replace(Current {
            id,
            cancelable,
            token,
        }) {
            debug!(previous = previous.id.0, next = id.0, "loading association replaced");
        }
        self.indicator.show(cancelable);
        drop(current);
        LoadingHandle {
            id,
            cancelable,
            released: AtomicBool::new(false),
        }
    }

    /// Releases `handle`. Idempotent; hides the indicator only if the handle
    /// is still the current one.
    pub fn release(&self, handle: &LoadingHandle) {
        if handle.released.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|c| c.id == handle.id) {
            current.take();
            self.indicator.hide();
        }
    }

    /// The widget's cancel gesture.
    ///
    /// Cancels the current request and hides the indicator when the current
    /// handle is cancelable; otherwise the gesture is ignored.
    pub fn dismiss_by_user(&self) -> bool {
        let mut current = self.current.lock();
        let Some(dismissed) = current.take_if(|c| c.cancelable) else {
            return false;
        };
        self.indicator.hide();
        drop(current);

        debug!(loading_id = dismissed.id.0, "loading dismissed by user");
        dismissed.token.cancel();
        true
    }

    /// Whether any handle is currently associated with the indicator.
    #[must_use]
    pub fn is_showing(&self) -> bool {
        self.current.lock().is_some()
    }
}

impl std::fmt::Debug for LoadingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingController")
            .field("showing", &self.is_showing())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
