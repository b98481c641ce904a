//! Router-level tests that never reach the store: the pool is lazy (no
//! connection is made until a query runs), so any request that passes
//! validation would fail loudly. Everything asserted here must be rejected
//! or answered before store access.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use table_gateway::{common_routes, table_routes, AppState};
use tower::ServiceExt;

fn app() -> Router {
    // Nothing listens on this port; a lazy pool only fails when used.
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://127.0.0.1:1/unreachable")
        .unwrap();
    let state = AppState { pool };
    Router::new()
        .merge(common_routes(state.clone()))
        .nest("/api", table_routes(state))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn unknown_table_is_rejected_on_every_verb() {
    let cases = [
        (Method::GET, "/api/tables/users", None),
        (Method::GET, "/api/tables/users/some-id", None),
        (Method::POST, "/api/tables/users", Some("{\"a\":1}")),
        (Method::PUT, "/api/tables/users/some-id", Some("{\"a\":1}")),
        (Method::PATCH, "/api/tables/users/some-id", Some("{\"a\":1}")),
        (Method::DELETE, "/api/tables/users/some-id", None),
    ];
    for (method, uri, body) in cases {
        let req = match body {
            Some(b) => json_request(method.clone(), uri, b),
            None => Request::builder()
                .method(method.clone())
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method} {uri}");
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "invalid_table");
    }
}

#[tokio::test]
async fn table_names_are_matched_exactly() {
    for name in ["Blog_Posts", "blog_posts%20", "blog_posts;drop", "tables"] {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/tables/{name}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{name}");
    }
}

#[tokio::test]
async fn malformed_json_body_gets_the_json_error_envelope() {
    let response = app()
        .oneshot(json_request(Method::POST, "/api/tables/events", "{not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap()),
        Some("application/json")
    );
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "bad_request");
}

#[tokio::test]
async fn missing_content_type_gets_the_json_error_envelope() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/tables/events")
                .body(Body::from("{\"title\":\"x\"}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap()),
        Some("application/json")
    );
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "bad_request");
}

#[tokio::test]
async fn non_object_body_is_rejected_before_store_access() {
    // Array bodies parse as JSON but are not records; the invalid-table check
    // still runs first so the pool stays untouched here too.
    let response = app()
        .oneshot(json_request(Method::PUT, "/api/tables/users/x", "[1,2,3]"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "invalid_table");
}

#[tokio::test]
async fn post_to_a_record_path_is_method_not_allowed() {
    let response = app()
        .oneshot(json_request(Method::POST, "/api/tables/events/some-id", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn cors_preflight_succeeds_for_any_origin() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/tables/events")
                .header(header::ORIGIN, "https://school.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap()),
        Some("*")
    );
}

#[tokio::test]
async fn error_responses_carry_cors_headers() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/tables/users")
                .header(header::ORIGIN, "https://school.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn health_answers_without_a_database() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn version_reports_the_crate() {
    let response = app()
        .oneshot(Request::builder().uri("/version").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "table-gateway");
}
