mod common;

use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::json;
use tareas_api::auth::TokenService;
use tareas_api::models::User;

use common::{bearer, init_app, login, register, send, TestContext, TEST_SECRET};

#[test_log::test(actix_rt::test)]
async fn test_register_and_login_flow() {
    let ctx = TestContext::new();
    let app = init_app(&ctx.state).await;

    let (status, body) = register(&app, "alice", "correct").await;
    assert_eq!(status, StatusCode::CREATED, "Registration failed: {}", body);
    assert_eq!(body["username"], "alice");
    let register_token = body["token"].as_str().unwrap().to_string();
    assert!(!register_token.is_empty());

    let (status, body) = login(&app, "alice", "wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = login(&app, "alice", "correct").await;
    assert_eq!(status, StatusCode::OK, "Login failed: {}", body);
    assert_eq!(body["username"], "alice");
    let login_token = body["token"].as_str().unwrap().to_string();

    // Both tokens open the protected scope.
    for token in [&register_token, &login_token] {
        let req = test::TestRequest::get()
            .uri("/tareas")
            .insert_header(bearer(token))
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    let claims = TokenService::new(TEST_SECRET, None)
        .verify(&login_token)
        .unwrap();
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.sub, 1);
}

#[actix_rt::test]
async fn test_form_encoded_credentials() {
    let ctx = TestContext::new();
    let app = init_app(&ctx.state).await;

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_form(vec![("username", "form_user"), ("password", "from a form")])
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED, "Registration failed: {}", body);
    assert_eq!(body["username"], "form_user");

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_form(vec![("username", "form_user"), ("password", "from a form")])
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "Login failed: {}", body);
    assert!(body["token"].is_string());

    // A JSON login for the same account works too.
    let (status, _) = login(&app, "form_user", "from a form").await;
    assert_eq!(status, StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_form(vec![("username", "no_password")])
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username and password are required");
}

#[actix_rt::test]
async fn test_duplicate_registration_is_rejected() {
    let ctx = TestContext::new();
    let app = init_app(&ctx.state).await;

    for (username, password) in [("alice", "pw"), ("bob", "secret"), ("Carol Smith", "x")] {
        let (status, _) = register(&app, username, password).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = register(&app, username, "another").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "User already exists");
    }

    // The original password still works after the rejected attempt.
    let (status, _) = login(&app, "alice", "pw").await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_rt::test]
async fn test_invalid_registration_inputs() {
    let ctx = TestContext::new();
    let app = init_app(&ctx.state).await;

    let test_cases = vec![
        (json!({ "password": "Password123!" }), "missing username"),
        (json!({ "username": "testuser" }), "missing password"),
        (json!({ "username": "", "password": "Password123!" }), "empty username"),
        (json!({ "username": "testuser", "password": "" }), "empty password"),
        (json!({}), "empty object"),
        (json!({ "username": 42, "password": "x" }), "wrong type"),
    ];

    for (payload, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(&payload)
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(
            status,
            StatusCode::BAD_REQUEST,
            "Test case failed: {}. Body: {}",
            description,
            body
        );
        assert!(body["error"].is_string(), "{}: no error message", description);
    }

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{ not json")
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid JSON"));

    assert!(ctx.state.credentials.store().load().await.is_empty());
}

#[actix_rt::test]
async fn test_invalid_login_inputs() {
    let ctx = TestContext::new();
    let app = init_app(&ctx.state).await;

    let (status, _) = register(&app, "login_user", "Password123!").await;
    assert_eq!(status, StatusCode::CREATED);

    let test_cases = vec![
        (json!({ "password": "Password123!" }), "missing username"),
        (json!({ "username": "login_user" }), "missing password"),
        (
            json!({ "username": "login_user", "password": "WrongPassword123!" }),
            "incorrect password",
        ),
        (
            json!({ "username": "LOGIN_USER", "password": "Password123!" }),
            "username differs in case",
        ),
        (
            json!({ "username": "nonexistent", "password": "Password123!" }),
            "non-existent user",
        ),
    ];

    for (payload, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(&payload)
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(
            status,
            StatusCode::UNAUTHORIZED,
            "Test case failed: {}. Body: {}",
            description,
            body
        );
    }
}

#[actix_rt::test]
async fn test_password_is_stored_hashed() {
    let ctx = TestContext::new();
    let app = init_app(&ctx.state).await;

    let (status, _) = register(&app, "alice", "correct horse").await;
    assert_eq!(status, StatusCode::CREATED);

    let raw = std::fs::read_to_string(&ctx.state.config.users_file).unwrap();
    let users: Vec<User> = serde_json::from_str(&raw).unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "alice");
    assert_ne!(users[0].password_hash, "correct horse");
    assert!(bcrypt::verify("correct horse", &users[0].password_hash).unwrap());
}

#[actix_rt::test]
async fn test_corrupted_user_file_reads_as_empty() {
    let ctx = TestContext::new();
    std::fs::write(&ctx.state.config.users_file, "definitely not json").unwrap();
    let app = init_app(&ctx.state).await;

    let (status, _) = login(&app, "alice", "pw").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = register(&app, "alice", "pw").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = login(&app, "alice", "pw").await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_rt::test]
async fn test_concurrent_registrations_are_all_persisted() {
    let ctx = TestContext::new();
    let credentials = ctx.state.credentials.clone();

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let credentials = credentials.clone();
            actix_rt::spawn(async move {
                credentials
                    .register(&format!("user-{}", i), "pw")
                    .await
                    .map(|r| r.username)
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let users = credentials.store().load().await;
    let mut names: Vec<String> = users.iter().map(|u| u.username.clone()).collect();
    names.sort();
    let mut expected: Vec<String> = (0..12).map(|i| format!("user-{}", i)).collect();
    expected.sort();
    assert_eq!(names, expected);

    let mut ids: Vec<i64> = users.iter().map(|u| u.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 12, "user ids must be unique");
}

#[actix_rt::test]
async fn test_concurrent_duplicate_registration_admits_one() {
    let ctx = TestContext::new();
    let credentials = ctx.state.credentials.clone();

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let credentials = credentials.clone();
            actix_rt::spawn(async move { credentials.register("same-name", "pw").await.is_ok() })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(credentials.store().load().await.len(), 1);
}

#[actix_rt::test]
async fn test_expiring_tokens_when_lifetime_configured() {
    let ctx = TestContext::with_config(|config| config.jwt_expiration_hours = Some(1));
    let app = init_app(&ctx.state).await;

    let (_, body) = register(&app, "alice", "pw").await;
    let token = body["token"].as_str().unwrap();
    let claims = ctx.state.tokens.verify(token).unwrap();
    assert!(claims.exp.is_some());

    // A token minted without `exp` is no longer accepted.
    let unexpiring = TokenService::new(TEST_SECRET, None)
        .generate(claims.sub, "alice")
        .unwrap();
    let req = test::TestRequest::get()
        .uri("/tareas")
        .insert_header(bearer(&unexpiring))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
