use crate::executor::ExecutionRequest;
use tracing::info;

const NONE: &str = "<none>";

/// Logs the selection an execution runs with.
pub(crate) fn log_context(service: &str, request: &ExecutionRequest<'_>) {
    info!(
        service,
        account = request.account_id().unwrap_or(NONE),
        service_id = request.service_id().unwrap_or(NONE),
        object = request.object_value().unwrap_or(NONE),
        "service function context"
    );
}
