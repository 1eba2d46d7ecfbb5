//! Uniform JSON body for failures produced by the host itself: unmatched
//! routes, wrong methods, oversized bodies and timeouts. Feature modules
//! render their own failures in the same shape.

use axum::{
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HostErrorBody {
    timestamp: DateTime<Utc>,
    status_code: u16,
    message: String,
    error_category: String,
    request_path: String,
}

fn message_for(status: StatusCode, path: &str) -> String {
    match status {
        StatusCode::NOT_FOUND => format!("No route for {path}"),
        StatusCode::METHOD_NOT_ALLOWED => "Method not allowed".to_string(),
        StatusCode::REQUEST_TIMEOUT => "Request timed out".to_string(),
        StatusCode::PAYLOAD_TOO_LARGE => "Request body too large".to_string(),
        s if s.is_server_error() => "Unexpected error".to_string(),
        s => s.canonical_reason().unwrap_or("Request failed").to_string(),
    }
}

fn is_json(resp: &Response) -> bool {
    resp.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// Replace non-JSON error responses with the uniform error body. Responses
/// that already carry JSON pass through untouched.
pub async fn uniform_errors(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let resp = next.run(req).await;

    let status = resp.status();
    if !(status.is_client_error() || status.is_server_error()) || is_json(&resp) {
        return resp;
    }

    tracing::debug!(status = status.as_u16(), path = %path, "Rendering host error body");
    let allow: Option<HeaderValue> = resp.headers().get(header::ALLOW).cloned();
    let body = HostErrorBody {
        timestamp: Utc::now(),
        status_code: status.as_u16(),
        message: message_for(status, &path),
        error_category: status
            .canonical_reason()
            .unwrap_or("Unknown Error")
            .to_string(),
        request_path: path,
    };

    let mut out = (status, Json(body)).into_response();
    if let Some(allow) = allow {
        out.headers_mut().insert(header::ALLOW, allow);
    }
    out
}
