pub mod attendance;
pub mod classes;
pub mod leaves;
pub mod setup;
pub mod users;

use rollcall_auth::{Caller, Operation, Target};
use rollcall_core::AppError;
use tracing::debug;

use crate::metrics::track_authorization_denied;

/// Consults the authorization policy, recording denials.
pub(crate) fn authorize(
    caller: &Caller,
    operation: Operation,
    target: &Target,
) -> Result<(), AppError> {
    rollcall_auth::authorize(caller, operation, target).inspect_err(|_| {
        debug!(caller = %caller.id, role = %caller.role, %operation, "Authorization denied");
        track_authorization_denied(caller.role);
    })
}
