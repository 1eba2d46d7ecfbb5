use axum::http::{HeaderName, Request};
use axum::{body::Body, middleware::Next, response::Response};
use tower_http::request_id::{MakeRequestId, RequestId};
use tower_http::trace::{MakeSpan, OnResponse};
use tracing::field::Empty;

/// Request id as seen by handlers (`Extension<XRequestId>`).
#[derive(Clone, Debug)]
pub struct XRequestId(pub String);

pub fn header() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

fn request_id_of<B>(req: &Request<B>) -> &str {
    req.headers()
        .get(header())
        .and_then(|v| v.to_str().ok())
        .unwrap_or("n/a")
}

/// Generates a nanoid when the client did not send `x-request-id`.
#[derive(Clone, Default)]
pub struct MakeReqId;

impl MakeRequestId for MakeReqId {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        let id = nanoid::nanoid!();
        Some(RequestId::new(id.parse().ok()?))
    }
}

/// Middleware that stores request_id in Request.extensions and records it in the current span
pub async fn push_req_id_to_extensions(mut req: Request<Body>, next: Next) -> Response {
    let rid = request_id_of(&req).to_owned();
    tracing::Span::current().record("request_id", tracing::field::display(&rid));
    req.extensions_mut().insert(XRequestId(rid));
    next.run(req).await
}

/// One `http_request` span per request; status and latency are filled in on response.
#[derive(Clone, Copy, Default)]
pub struct HttpSpan;

impl<B> MakeSpan<B> for HttpSpan {
    fn make_span(&mut self, req: &Request<B>) -> tracing::Span {
        tracing::info_span!(
            "http_request",
            method = %req.method(),
            path = %req.uri().path(),
            request_id = %request_id_of(req),
            status = Empty,
            latency_ms = Empty
        )
    }
}

impl<B> OnResponse<B> for HttpSpan {
    fn on_response(
        self,
        response: &axum::http::Response<B>,
        latency: std::time::Duration,
        span: &tracing::Span,
    ) {
        let status = response.status().as_u16();
        span.record("status", status);
        span.record("latency_ms", latency.as_millis() as u64);
        if response.status().is_server_error() {
            tracing::warn!(status, "request finished");
        } else {
            tracing::info!(status, "request finished");
        }
    }
}
