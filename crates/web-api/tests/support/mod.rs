#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use config::AppConfig;
use infrastructure::Infrastructure;
use serde_json::{json, Value};
use tower::ServiceExt;
use web_api::{router, AppState};

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "web-api-test-secret-with-enough-length".to_string();
    config.auth.bcrypt_cost = Some(4);
    config
}

/// 基于内存存储的完整路由。
pub fn build_router() -> Router {
    let infra = Infrastructure::in_memory(&test_config());
    router(AppState::from_infrastructure(&infra))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let headers = response.headers().clone();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));
    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

pub async fn signup(app: &Router, username: &str, password: &str) -> TestResponse {
    send(
        app,
        json_request(
            "POST",
            "/api/users/",
            None,
            json!({ "username": username, "password": password }),
        ),
    )
    .await
}

pub async fn request_token(app: &Router, username: &str, password: &str) -> TestResponse {
    let request = Request::builder()
        .method("POST")
        .uri("/token/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "grant_type=password&username={username}&password={password}"
        )))
        .expect("request");
    send(app, request).await
}

/// 注册并登录，返回访问令牌。
pub async fn signup_and_login(app: &Router, username: &str, password: &str) -> String {
    assert_eq!(signup(app, username, password).await.status, StatusCode::OK);
    let response = request_token(app, username, password).await;
    assert_eq!(response.status, StatusCode::OK);
    response.body["access_token"]
        .as_str()
        .expect("access token")
        .to_string()
}
