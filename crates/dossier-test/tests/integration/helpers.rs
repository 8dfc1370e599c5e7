#![allow(
    clippy::unused_async,
    clippy::expect_used,
    dead_code,
    clippy::too_many_arguments
)]
//! Test helpers for integration tests.
//!
//! Provides utilities for:
//! - Creating an isolated Salvo service per test, backed by its own store
//! - Making HTTP requests with one of the configured bearer tokens
//! - Asserting on responses and store state
//!
//! ## Isolation
//! Every `TestApp` owns a fresh `MemoryStore` and Casbin enforcer, so tests
//! can run in parallel without sharing state.

use std::sync::Arc;

use salvo::http::header::HeaderName;
use salvo::http::{Method, ReqBody, StatusCode};
use salvo::prelude::*;
use salvo::test::{RequestBuilder, ResponseExt, TestClient};
use serde_json::Value;

use dossier_test::app::app::service;
use dossier_test::component::auth::{casbin::init_casbin, token_digest};
use dossier_test::component::config::{ApiToken, Role, Settings};
use dossier_test::component::db::store::{MemoryStore, StoreHandler};
use dossier_test::component::intake::patterns::builtin_patterns;

pub use tracing;

pub const VIEWER_TOKEN: &str = "viewer-secret";
pub const EDITOR_TOKEN: &str = "editor-secret";
pub const ADMIN_TOKEN: &str = "admin-secret";

/// Settings with defaults plus one token per role.
#[must_use]
pub fn test_config() -> Settings {
    let mut settings = Settings::from_toml_str(
        r#"
        [server]
        cors_allow_origin = "https://dossier.example"
        "#,
    )
    .expect("test configuration should parse");

    settings.auth.tokens = [
        (VIEWER_TOKEN, "viewer@example.org", Role::Viewer),
        (EDITOR_TOKEN, "editor@example.org", Role::Editor),
        (ADMIN_TOKEN, "admin@example.org", Role::Admin),
    ]
    .into_iter()
    .map(|(token, subject, role)| ApiToken {
        token_sha256: token_digest(token),
        subject: subject.to_string(),
        role,
    })
    .collect();

    settings
}

/// A service together with the store behind it.
pub struct TestApp {
    pub service: Service,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    /// ## Panics
    /// Panics if the enforcer or router cannot be built.
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::with_patterns(builtin_patterns()));
        let enforcer = init_casbin()
            .await
            .expect("Failed to initialize Casbin enforcer for tests");
        let service = service(
            Arc::new(test_config()),
            StoreHandler::shared(Arc::clone(&store)),
            Arc::new(enforcer),
        )
        .expect("API routes should be valid");

        Self { service, store }
    }

    pub async fn send(&self, request: TestRequest) -> TestResponse {
        request.send(&self.service).await
    }
}

/// Test request builder for constructing HTTP requests.
pub struct TestRequest {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl TestRequest {
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn options(path: &str) -> Self {
        Self::new(Method::OPTIONS, path)
    }

    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Sets `Authorization: Bearer <token>`.
    #[must_use]
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", &format!("Bearer {token}"))
    }

    #[must_use]
    pub fn content_type(self, content_type: &str) -> Self {
        self.header("Content-Type", content_type)
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a JSON request body.
    #[must_use]
    pub fn json_body(self, value: &Value) -> Self {
        self.content_type("application/json")
            .body(value.to_string().into_bytes())
    }

    /// Sends the request to the service and returns the response.
    pub async fn send(self, service: &Service) -> TestResponse {
        let url = format!("http://127.0.0.1:5800{}", self.path);

        let mut client = match self.method.as_str() {
            "GET" => TestClient::get(&url),
            "POST" => TestClient::post(&url),
            "PUT" => TestClient::put(&url),
            "DELETE" => TestClient::delete(&url),
            "OPTIONS" => TestClient::options(&url),
            _ => RequestBuilder::new(&url, self.method.clone()),
        };

        for (name, value) in self.headers {
            if let Ok(header_name) = HeaderName::try_from(name.as_str()) {
                client = client.add_header(header_name, value, true);
            }
        }

        if let Some(body_bytes) = self.body {
            client = client.body(ReqBody::Once(body_bytes.into()));
        }

        let mut response = client.send(service).await;

        let status = response
            .status_code
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let body: Vec<u8> = response.take_bytes(None).await.unwrap_or_default().to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Represents an HTTP test response for assertions.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Asserts that the response status matches the expected code.
    #[must_use]
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {expected} but got {}: {}",
            self.status,
            self.body_string()
        );
        self
    }

    /// Asserts that the response status is in the 2xx range.
    #[must_use]
    pub fn assert_success(self) -> Self {
        assert!(
            self.status.is_success(),
            "Expected success status but got {}: {}",
            self.status,
            self.body_string()
        );
        self
    }

    /// Asserts that a header exists with the expected value.
    #[must_use]
    pub fn assert_header(self, name: &str, expected: &str) -> Self {
        let value = self.get_header(name);
        assert!(value.is_some(), "Header '{name}' not found in response");
        assert_eq!(
            value,
            Some(expected),
            "Header '{name}' expected '{expected}' but got '{value:?}'"
        );
        self
    }

    /// Asserts that a header exists, regardless of its value.
    #[must_use]
    pub fn assert_header_exists(self, name: &str) -> Self {
        assert!(
            self.get_header(name).is_some(),
            "Header '{name}' not found in response"
        );
        self
    }

    /// Asserts that the response body contains the specified substring.
    #[must_use]
    pub fn assert_body_contains(self, expected: &str) -> Self {
        let body = self.body_string();
        assert!(
            body.contains(expected),
            "Expected body to contain '{expected}' but got:\n{body}"
        );
        self
    }

    /// Asserts that the response body is empty.
    #[must_use]
    pub fn assert_body_empty(self) -> Self {
        assert!(
            self.body.is_empty(),
            "Expected empty body but got {} bytes",
            self.body.len()
        );
        self
    }

    /// Asserts the standard error body and returns it.
    pub fn assert_error(self, status: StatusCode, code: &str) -> Value {
        let body = self.assert_status(status).json();
        assert_eq!(body["error"], code, "unexpected error body: {body}");
        assert!(body["message"].is_string(), "missing message: {body}");
        assert!(body["message_ar"].is_string(), "missing message_ar: {body}");
        body
    }

    /// Returns the body as a UTF-8 string.
    #[must_use]
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parses the body as JSON.
    ///
    /// ## Panics
    /// Panics if the body is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|err| panic!("Body is not JSON ({err}):\n{}", self.body_string()))
    }

    /// Gets a header value by name (case-insensitive).
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
