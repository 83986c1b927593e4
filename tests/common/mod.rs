#![allow(dead_code)]

use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::StatusCode,
    middleware::{ErrorHandlers, Logger, NormalizePath},
    test, App,
};
use serde_json::{json, Value};
use tareas_api::{config::Config, error::render_internal_error, routes, AppState};
use tempfile::TempDir;

pub const TEST_SECRET: &str = "integration-test-secret";

/// A scratch data directory plus the state built on top of it.
///
/// The directory lives as long as the value, so keep it bound for the whole test.
pub struct TestContext {
    pub dir: TempDir,
    pub state: AppState,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let mut config = Config::for_data_dir(dir.path(), TEST_SECRET);
        // Minimum cost keeps the suite fast.
        config.bcrypt_cost = 4;
        adjust(&mut config);
        Self {
            state: AppState::new(config),
            dir,
        }
    }
}

pub async fn init_app(
    state: &AppState,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .wrap(
                ErrorHandlers::new()
                    .handler(StatusCode::INTERNAL_SERVER_ERROR, render_internal_error),
            )
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .configure(|cfg| routes::config(cfg, state)),
    )
    .await
}

/// Sends `req` and returns the status with the body parsed as JSON (`Null` when empty).
pub async fn send(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    req: actix_http::Request,
) -> (StatusCode, Value) {
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|e| {
            panic!(
                "Response body is not JSON ({}): {:?}",
                e,
                String::from_utf8_lossy(&body)
            )
        })
    };
    (status, json)
}

pub async fn register(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    password: &str,
) -> (StatusCode, Value) {
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    send(app, req).await
}

pub async fn login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    password: &str,
) -> (StatusCode, Value) {
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    send(app, req).await
}

/// Registers `username` and returns the issued token, failing the test otherwise.
pub async fn token_for(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
) -> String {
    let (status, body) = register(app, username, "Password123!").await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    body["token"]
        .as_str()
        .expect("token in register response")
        .to_string()
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
