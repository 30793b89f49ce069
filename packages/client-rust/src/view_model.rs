//! UI-binding entity: owns a task scope, a loading controller, and a
//! reference to the failure policy. Destroying it tears down every request
//! launched on it.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::ClientConfig;
use crate::loading::{LoadingController, LoadingIndicator, NoopIndicator};
use crate::policy::ErrorPolicy;
use crate::request::{Request, RequestHandle};
use crate::scope::TaskScope;

/// Owner of the requests issued on behalf of one screen or component.
#[derive(Debug)]
pub struct ViewModel {
    scope: TaskScope,
    loading: Arc<LoadingController>,
    policy: Arc<ErrorPolicy>,
    drain_timeout: Duration,
}

impl ViewModel {
    /// A view model using the process-wide error policy.
    #[must_use]
    pub fn new(name: impl Into<String>, indicator: Arc<dyn LoadingIndicator>) -> Self {
        Self::builder(name).indicator(indicator).build()
    }

    #[must_use]
    pub fn builder(name: impl Into<String>) -> ViewModelBuilder {
        ViewModelBuilder {
            name: name.into(),
            indicator: None,
            policy: None,
            drain_timeout: ClientConfig::default().drain_timeout,
        }
    }

    /// Builds and runs a request in one call.
    ///
    /// ```no_run
    /// # use std::sync::Arc;
    /// # use errand_client::{NoopIndicator, ViewModel};
    /// # use errand_core::Outcome;
    /// # async fn demo() {
    /// let vm = ViewModel::new("profile", Arc::new(NoopIndicator));
    /// vm.request(|r| {
    ///     r.on_request(|_ctx| async { Ok(Outcome::success(42_u32)) })
    ///         .on_success(|value| println!("loaded {value}"))
    /// });
    /// # }
    /// ```
    pub fn request<T, B>(&self, build: B) -> RequestHandle
    where
        T: Send + 'static,
        B: FnOnce(Request<T>) -> Request<T>,
    {
        build(Request::new()).run(self)
    }

    #[must_use]
    pub fn scope(&self) -> &TaskScope {
        &self.scope
    }

    #[must_use]
    pub fn loading(&self) -> &Arc<LoadingController> {
        &self.loading
    }

    #[must_use]
    pub fn policy(&self) -> &Arc<ErrorPolicy> {
        &self.policy
    }

    /// Cancels every request launched on this view model. Later requests
    /// only fire their completion hook.
    pub fn destroy(&self) {
        debug!(view_model = self.scope.name(), "destroying view model");
        self.scope.cancel();
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.scope.is_cancelled()
    }

    /// Waits for in-flight requests, up to the configured drain timeout.
    pub async fn wait_idle(&self) -> bool {
        self.scope.wait_for_drain(self.drain_timeout).await
    }
}

// ---------------------------------------------------------------------------
// ViewModelBuilder
// ---------------------------------------------------------------------------

/// Builder for [`ViewModel`]. Defaults: no-op indicator, global policy.
pub struct ViewModelBuilder {
    name: String,
    indicator: Option<Arc<dyn LoadingIndicator>>,
    policy: Option<Arc<ErrorPolicy>>,
    drain_timeout: Duration,
}

impl ViewModelBuilder {
    #[must_use]
    pub fn indicator(mut self, indicator: Arc<dyn LoadingIndicator>) -> Self {
        self.indicator = Some(indicator);
        self
    }

    /// Routes failures through `policy` instead of [`ErrorPolicy::global`].
    #[must_use]
    pub fn policy(mut self, policy: Arc<ErrorPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    #[must_use]
    pub fn config(mut self, config: &ClientConfig) -> Self {
        self.drain_timeout = config.drain_timeout;
        self
    }

    #[must_use]
    pub fn build(self) -> ViewModel {
        let indicator = self.indicator.unwrap_or_else(|| Arc::new(NoopIndicator));
        ViewModel {
            scope: TaskScope::new(self.name),
            loading: Arc::new(LoadingController::new(indicator)),
            policy: self.policy.unwrap_or_else(ErrorPolicy::global),
            drain_timeout: self.drain_timeout,
        }
    }
}
