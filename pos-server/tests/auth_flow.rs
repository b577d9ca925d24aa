//! Login, logout, registration and password reset.

mod common;

use axum::body::Body;
use common::TestApp;
use http::{Method, Request, StatusCode, header};
use pos_server::db::seed::DEMO_PASSWORD;
use serde_json::{Value, json};

fn registration(username: &str, email: &str) -> Value {
    json!({
        "email": email,
        "username": username,
        "password": "secret12",
        "fullName": "New Cashier",
        "mobileNumber": "0772222222",
        "nic": "951234567V"
    })
}

fn reset_token_from(text: &str) -> String {
    let start = text.find("token=").unwrap() + "token=".len();
    text[start..]
        .chars()
        .take_while(char::is_ascii_hexdigit)
        .collect()
}

#[tokio::test]
async fn login_sets_session_cookie_and_dispatches() {
    let app = TestApp::spawn().await;
    let res = app
        .post(
            "/api/auth/login",
            json!({"username": "  STAFF1 ", "password": DEMO_PASSWORD}),
            None,
        )
        .await;

    assert_eq!(res.status, StatusCode::OK, "{}", res.text);
    let cookie = res.set_cookie().unwrap();
    assert!(cookie.starts_with("pos_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));

    let body = res.json();
    assert_eq!(body["redirectTo"], "/staff");
    assert_eq!(body["user"]["role"], "STAFF");
    assert!(body["user"].get("passwordHash").is_none());

    let token = body["token"].as_str().unwrap();
    let status = app.get("/api/auth/status", Some(token)).await.json();
    assert_eq!(status["authenticated"], true);
    assert_eq!(status["user"]["username"], "staff1");
}

#[tokio::test]
async fn unknown_user_and_wrong_password_look_the_same() {
    let app = TestApp::spawn().await;
    let unknown = app
        .post("/api/auth/login", json!({"username": "nobody", "password": "x"}), None)
        .await;
    let wrong = app
        .post("/api/auth/login", json!({"username": "staff1", "password": "wrong"}), None)
        .await;

    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.text, wrong.text);
}

#[tokio::test]
async fn login_is_rate_limited() {
    let app = TestApp::spawn().await;
    for _ in 0..5 {
        let res = app
            .post("/api/auth/login", json!({"username": "staff1", "password": "bad"}), None)
            .await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    }
    let res = app
        .post("/api/auth/login", json!({"username": "staff1", "password": DEMO_PASSWORD}), None)
        .await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn rotating_forwarded_for_does_not_reset_the_login_limit() {
    let app = TestApp::spawn().await;
    let attempt = |n: usize| {
        Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", format!("203.0.113.{n}"))
            .body(Body::from(json!({"username": "staff1", "password": "bad"}).to_string()))
            .unwrap()
    };

    for n in 0..5 {
        assert_eq!(app.send(attempt(n)).await.status, StatusCode::UNAUTHORIZED);
    }
    assert_eq!(app.send(attempt(99)).await.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let app = TestApp::spawn().await;
    let token = app.staff_token().await;

    let res = app.post("/api/auth/logout", json!({}), Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.set_cookie().unwrap().contains("Max-Age=0"));

    let res = app.get_with_cookie("/logout", &token).await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location(), Some("/login"));
    assert!(res.set_cookie().unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn registration_creates_a_staff_account() {
    let app = TestApp::spawn().await;

    let res = app
        .post("/api/register", registration("Cashier9", "C9@Example.com"), None)
        .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.text);
    assert!(res.json()["user"]["id"].is_string());

    let token = app.login("cashier9", "secret12").await;
    let me = app.get("/api/auth/me", Some(&token)).await.json();
    assert_eq!(me["user"]["role"], "STAFF");

    let res = app
        .post("/api/register", registration("cashier9", "other@example.com"), None)
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.json()["code"], 3001);

    let res = app
        .post("/api/register", registration("cashier8", "c9@example.com"), None)
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.json()["code"], 3002);
}

#[tokio::test]
async fn registration_policy() {
    let app = TestApp::spawn().await;

    let mut body = registration("cashier7", "c7@example.com");
    body["password"] = json!("short");
    let res = app.post("/api/register", body, None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["code"], 3003);

    let mut body = registration("cashier7", "c7@example.com");
    body["nic"] = json!("");
    let res = app.post("/api/register", body, None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn owner_registration_needs_the_code_when_configured() {
    let app = TestApp::spawn_with(|c| c.owner_registration_code = Some("letmein".into())).await;

    let mut body = registration("owner222", "o222@example.com");
    body["role"] = json!("OWNER");
    let res = app.post("/api/register", body.clone(), None).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.json()["code"], 3004);

    body["ownerCode"] = json!("letmein");
    let res = app.post("/api/register", body, None).await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.text);

    let token = app.login("owner222", "secret12").await;
    let res = app.get_with_cookie("/auth/post-login", &token).await;
    assert_eq!(res.location(), Some("/owner"));
}

#[tokio::test]
async fn password_reset_round_trip() {
    let app = TestApp::spawn().await;

    // unknown accounts look identical and send nothing
    let res = app
        .post("/api/auth/forgot", json!({"identifier": "ghost@example.com"}), None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["ok"], true);
    assert!(app.mailer.sent().is_empty());

    let res = app.post("/api/auth/forgot", json!({"identifier": "  "}), None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .post("/api/auth/forgot", json!({"identifier": "STAFF@test.com"}), None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "staff@test.com");
    assert!(sent[0].text.contains("http://localhost:3000/reset-password?token="));
    let token = reset_token_from(&sent[0].text);
    assert_eq!(token.len(), 64);

    let res = app
        .post("/api/auth/reset", json!({"token": token, "password": "newpass12"}), None)
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text);

    // single use
    let res = app
        .post("/api/auth/reset", json!({"token": token, "password": "another12"}), None)
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["code"], 3005);

    app.login("staff1", "newpass12").await;
}

#[tokio::test]
async fn reset_validation() {
    let app = TestApp::spawn().await;

    let res = app.post("/api/auth/reset", json!({"token": "abc"}), None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["message"], "Missing token or password");

    let res = app
        .post("/api/auth/reset", json!({"token": "abc", "password": "longenough"}), None)
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["message"], "Invalid or expired token");

    let res = app
        .post("/api/auth/request-reset", json!({"email": "owner@test.com"}), None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(app.mailer.sent().len(), 1);
}
