//! Common test utilities for learnershub integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use axum_test::{TestResponse, TestServer, TestServerConfig, Transport};
use serde_json::{json, Value};

use learnershub_service::{create_router, AppState, ServiceConfig, StorageBackend};
use learnershub_store::Repository;

pub const ADMIN_EMAIL: &str = "admin@learnershub.com";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Direct access to the records behind the server.
    pub store: Arc<Repository>,
}

impl TestHarness {
    /// Create a new test harness over an empty in-memory store.
    ///
    /// Must be called inside a tokio runtime (the activity monitor is spawned).
    pub fn new() -> Self {
        Self::with_store(Arc::new(Repository::in_memory()))
    }

    /// Create a harness over an existing repository.
    pub fn with_store(store: Arc<Repository>) -> Self {
        Self::build(store, None)
    }

    /// Create a harness served over a real socket, needed for WebSocket tests.
    pub fn with_http_transport() -> Self {
        Self::build(
            Arc::new(Repository::in_memory()),
            Some(Transport::HttpRandomPort),
        )
    }

    fn build(store: Arc<Repository>, transport: Option<Transport>) -> Self {
        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            storage_backend: StorageBackend::Memory,
            activity_poll_seconds: 1,
            ..ServiceConfig::default()
        };

        let state = AppState::new(store.clone(), config);
        let router: Router = create_router(state);

        let server_config = TestServerConfig {
            transport,
            ..TestServerConfig::default()
        };
        let server =
            TestServer::new_with_config(router, server_config).expect("Failed to create test server");

        Self { server, store }
    }

    /// Authorization header for a session token.
    pub fn auth(token: &str) -> (HeaderName, HeaderValue) {
        (
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).expect("valid header"),
        )
    }

    /// Register an account.
    pub async fn register(&self, name: &str, email: &str, password: &str, role: &str) -> TestResponse {
        self.server
            .post("/v1/auth/register")
            .json(&json!({
                "name": name,
                "email": email,
                "password": password,
                "role": role
            }))
            .await
    }

    /// Log in and return the session token.
    pub async fn login(&self, email: &str, password: &str, role: &str) -> String {
        let response = self
            .server
            .post("/v1/auth/login")
            .json(&json!({ "email": email, "password": password, "role": role }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        body["token"].as_str().expect("token").to_string()
    }

    /// Admin session token.
    pub async fn admin(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD, "admin").await
    }

    /// Register a student and return their session token.
    pub async fn student(&self, name: &str, email: &str) -> String {
        self.register(name, email, "student-pw", "student")
            .await
            .assert_status_ok();
        self.login(email, "student-pw", "student").await
    }

    /// Register an instructor and return their session token.
    pub async fn instructor(&self, name: &str, email: &str) -> String {
        self.register(name, email, "instructor-pw", "instructor")
            .await
            .assert_status_ok();
        self.login(email, "instructor-pw", "instructor").await
    }

    /// Create an active course and return its id.
    pub async fn create_course(&self, admin_token: &str, body: Value) -> u64 {
        let (name, value) = Self::auth(admin_token);
        let response = self
            .server
            .post("/v1/courses")
            .add_header(name, value)
            .json(&body)
            .await;
        response.assert_status_ok();
        let course: Value = response.json();
        course["id"].as_u64().expect("course id")
    }

    /// Create an active course with `modules` plain modules.
    pub async fn simple_course(&self, admin_token: &str, title: &str, modules: u32) -> u64 {
        self.create_course(
            admin_token,
            json!({ "title": title, "module_count": modules, "status": "active" }),
        )
        .await
    }

    /// GET with a session.
    pub async fn get(&self, token: &str, path: &str) -> TestResponse {
        let (name, value) = Self::auth(token);
        self.server.get(path).add_header(name, value).await
    }

    /// POST JSON with a session.
    pub async fn post(&self, token: &str, path: &str, body: Value) -> TestResponse {
        let (name, value) = Self::auth(token);
        self.server.post(path).add_header(name, value).json(&body).await
    }

    /// PUT JSON with a session.
    pub async fn put(&self, token: &str, path: &str, body: Value) -> TestResponse {
        let (name, value) = Self::auth(token);
        self.server.put(path).add_header(name, value).json(&body).await
    }

    /// DELETE with a session and optional JSON body.
    pub async fn delete(&self, token: &str, path: &str, body: Option<Value>) -> TestResponse {
        let (name, value) = Self::auth(token);
        let request = self.server.delete(path).add_header(name, value);
        match body {
            Some(body) => request.json(&body).await,
            None => request.await,
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
