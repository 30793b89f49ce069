//! Process bootstrap: logging and the default failure handler.
//!
//! Call once at startup, before the first view model issues a request.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::ClientConfig;
use crate::policy::ErrorPolicy;
use crate::presenter::Presenter;

/// Validates `config`, initializes tracing, and installs the default global
/// failure handler on top of `presenter`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
pub fn init(config: &ClientConfig, presenter: Arc<dyn Presenter>) -> anyhow::Result<()> {
    config.validate()?;
    init_tracing(config);
    ErrorPolicy::global().install_default(presenter);
    info!(
        debug = config.debug,
        request_timeout_ms = u64::try_from(config.request_timeout.as_millis()).unwrap_or(u64::MAX),
        "errand client initialized"
    );
    Ok(())
}

/// Installs the global `tracing` subscriber.
///
/// Returns `false` if a subscriber was already installed (the existing one
/// stays in place).
pub fn init_tracing(config: &ClientConfig) -> bool {
    let filter = EnvFilter::try_new(config.effective_log_filter())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .is_ok()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(config.debug))
            .try_init()
            .is_ok()
    }
}
