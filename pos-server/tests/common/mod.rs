//! In-process test harness: temp SQLite file, demo data, full router.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{HeaderMap, Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use pos_server::core::{Config, ServerState, build_router};
use pos_server::db::DbService;
use pos_server::db::repository::product;
use pos_server::db::seed::{DEMO_PASSWORD, seed_demo_data};
use pos_server::email::MemoryMailer;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

pub struct TestApp {
    pub router: Router,
    pub state: ServerState,
    pub mailer: MemoryMailer,
    _dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).unwrap_or(Value::Null)
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(tweak: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pos-test.db");
        let mut config = Config::for_database(path.to_string_lossy(), JWT_SECRET);
        tweak(&mut config);

        let db = DbService::new(&config.database_path).await.unwrap();
        seed_demo_data(&db.pool).await.unwrap();

        let mailer = MemoryMailer::new();
        let state = ServerState::new(config, db, Arc::new(mailer.clone()));
        let router = build_router(state.clone());

        Self {
            router,
            state,
            mailer,
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// JSON request with an optional bearer token
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.call(Method::GET, uri, None, token).await
    }

    pub async fn post(&self, uri: &str, body: Value, token: Option<&str>) -> TestResponse {
        self.call(Method::POST, uri, Some(body), token).await
    }

    /// Request carrying the session as a cookie, like a browser
    pub async fn get_with_cookie(&self, uri: &str, token: &str) -> TestResponse {
        let request = Request::builder()
            .uri(uri)
            .header(header::COOKIE, format!("pos_session={token}"))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let res = self
            .post(
                "/api/auth/login",
                serde_json::json!({ "username": username, "password": password }),
                None,
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.text);
        res.json()["token"].as_str().unwrap().to_string()
    }

    pub async fn staff_token(&self) -> String {
        self.login("staff1", DEMO_PASSWORD).await
    }

    pub async fn owner_token(&self) -> String {
        self.login("owner1", DEMO_PASSWORD).await
    }

    pub async fn product_id(&self, barcode: &str) -> String {
        product::find_by_barcode(self.state.pool(), barcode)
            .await
            .unwrap()
            .unwrap()
            .id
    }
}
