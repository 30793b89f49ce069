//! Presentation collaborator used by the default failure handler.

/// Surfaces a short user-facing message (toast, snackbar, status line).
pub trait Presenter: Send + Sync {
    fn present(&self, message: &str);
}

/// Headless presenter: writes the message as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn present(&self, message: &str) {
        tracing::warn!(target: "errand::toast", "{message}");
    }
}
