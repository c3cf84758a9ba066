use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

/// Render the JSON error body shared by every service:
/// `{"kind": "SCHEDULE_NOT_FOUND", "message": "schedule not found"}`.
///
/// Service error enums call this from their `IntoResponse` impl so the wire
/// shape stays identical across services.
pub fn error_response(status: StatusCode, kind: &'static str, message: String) -> Response {
    let body = serde_json::json!({
        "kind": kind,
        "message": message,
    });
    (status, axum::Json(body)).into_response()
}

/// Same as [`error_response`] with a `Retry-After` header, for failures the
/// caller may safely retry.
pub fn retryable_error_response(
    status: StatusCode,
    kind: &'static str,
    message: String,
    retry_after_secs: u32,
) -> Response {
    let mut resp = error_response(status, kind, message);
    resp.headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
    resp
}
