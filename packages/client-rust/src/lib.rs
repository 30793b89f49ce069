//! errand client: asynchronous request orchestration for UI-bound code.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`request`] | `Request` builder, lifecycle orchestrator, two-tier failure routing |
//! | [`view_model`] | `ViewModel`: the UI-binding entity owning a scope and a loading controller |
//! | [`scope`] | `TaskScope`: structured cancellation and in-flight tracking |
//! | [`loading`] | `LoadingController` and the `LoadingIndicator` widget seam |
//! | [`policy`] | `ErrorPolicy`: the process-wide fallback failure handler |
//! | [`bootstrap`] / [`config`] | Startup wiring and configuration |

pub mod bootstrap;
pub mod config;
pub mod loading;
pub mod policy;
pub mod presenter;
pub mod request;
pub mod scope;
pub mod timeout;
pub mod view_model;

pub use config::{ClientConfig, ConfigError};
pub use loading::{LoadingController, LoadingHandle, LoadingId, LoadingIndicator, NoopIndicator};
pub use policy::{ErrorPolicy, FailureHandler};
pub use presenter::{LogPresenter, Presenter};
pub use request::{Request, RequestContext, RequestHandle, RequestId};
pub use scope::TaskScope;
pub use timeout::with_timeout;
pub use view_model::{ViewModel, ViewModelBuilder};
