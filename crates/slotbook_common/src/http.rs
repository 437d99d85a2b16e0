// --- File: crates/slotbook_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::error::{HttpStatusCode, SlotbookError};

pub mod client;

/// Body shared by every error answer: `{"error": {"message", "code"[, "fields"]}}`.
pub fn error_body(err: &SlotbookError, status: StatusCode) -> Value {
    let mut error = json!({
        "message": err.to_string(),
        "code": status.as_u16(),
    });
    if let SlotbookError::InvalidFields(fields) = err {
        error["fields"] = json!(fields);
    }
    json!({ "error": error })
}

/// Handlers return `Result<_, SlotbookError>` directly.
impl IntoResponse for SlotbookError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(error_body(&self, status))).into_response()
    }
}
