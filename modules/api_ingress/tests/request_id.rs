use axum::{
    body::Body,
    extract::Extension,
    http::{Request, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

use api_ingress::request_id::XRequestId;
use api_ingress::{ApiIngress, ApiIngressConfig};

fn test_app() -> Router {
    let routes = Router::new()
        .route("/test", get(success_handler))
        .route("/error", get(error_handler));
    ApiIngress::new(ApiIngressConfig::default()).build_router(routes, None)
}

async fn success_handler(
    Extension(XRequestId(request_id)): Extension<XRequestId>,
) -> Json<Value> {
    Json(json!({"status": "ok", "request_id": request_id}))
}

async fn error_handler(
    Extension(XRequestId(request_id)): Extension<XRequestId>,
) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"message": "Unexpected error", "request_id": request_id})),
    )
}

async fn body_json(resp: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn generates_request_id_when_missing() {
    let response = test_app()
        .oneshot(Request::builder().uri("/test").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("x-request-id should be generated");
    assert!(!request_id.is_empty());

    // Handlers observe the generated id, not a placeholder
    let json = body_json(response).await;
    assert_eq!(json["request_id"], request_id);
}

#[tokio::test]
async fn preserves_incoming_request_id() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/test")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok());
    assert_eq!(request_id, Some("abc-123"));
}

#[tokio::test]
async fn echoes_request_id_on_error_responses() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/error")
                .header("x-request-id", "error-test-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok());
    assert_eq!(request_id, Some("error-test-123"));

    let json = body_json(response).await;
    assert_eq!(json["request_id"], "error-test-123");
}
