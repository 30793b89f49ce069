//! Two-tier failure routing: global policy first, then the local hook.

use errand_core::ErrorInfo;
use tracing::debug;

use crate::policy::ErrorPolicy;

use super::FailHook;

/// Routes a classified failure.
///
/// Cancellations are dropped. Otherwise the policy's handler is loaded once
/// and invoked, then the local hook runs with the same error. Local handling
/// never suppresses the global notification.
pub(crate) fn route(policy: &ErrorPolicy, local: Option<FailHook>, error: ErrorInfo) {
    if error.is_cancellation() {
        debug!("cancellation is not reported to failure handlers");
        return;
    }
    if !policy.notify(&error) {
        debug!(kind = %error.kind(), "no global failure handler installed");
    }
    if let Some(local) = local {
        local(error);
    }
}
