/**
 * Error Conversion
 *
 * Conversions into `BackendError` from the adapter error types, and the
 * axum `IntoResponse` implementation used by the REST surface.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": "Error message",
 *   "kind": "forbidden",
 *   "status": 403
 * }
 * ```
 */

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use crate::backend::error::types::BackendError;
use crate::backend::ledger::LedgerError;
use crate::backend::workspace::MembershipError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": self.message(),
            "kind": self.kind(),
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for BackendError {
    fn from(err: LedgerError) -> Self {
        tracing::error!("[Ledger] {}", err);
        BackendError::persist("the message store could not complete the request")
    }
}

impl From<MembershipError> for BackendError {
    fn from(err: MembershipError) -> Self {
        tracing::error!("[Membership] {}", err);
        BackendError::unavailable("workspace membership could not be checked")
    }
}
