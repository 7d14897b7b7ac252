use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use blogauth::{auth, AppState, AuthConfig, InMemoryUserRepository};

pub const TEST_SECRET: &str = "integration-test-secret";

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestApp {
    pub router: Router,
    pub repository: Arc<InMemoryUserRepository>,
    pub config: AuthConfig,
}

#[allow(dead_code)]
impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AuthConfig::new(TEST_SECRET).with_password_hash_cost(4))
    }

    pub fn with_config(config: AuthConfig) -> Self {
        let repository = Arc::new(InMemoryUserRepository::new());
        let state = AppState::new(repository.clone(), config.clone());

        Self {
            router: auth::router().with_state(state),
            repository,
            config,
        }
    }

    /// Sends a request and returns the status with the JSON body, if any
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Option<Value>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        if bytes.is_empty() {
            (status, None)
        } else {
            (status, Some(serde_json::from_slice(&bytes).unwrap()))
        }
    }

    pub async fn register(&self, username: &str, password: &str) -> (StatusCode, Option<Value>) {
        self.send(credentials_request("/register-user", username, password))
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, Option<Value>) {
        self.send(credentials_request("/login-user", username, password))
            .await
    }

    /// Logs in and returns the issued token, panicking if login fails
    pub async fn login_token(&self, username: &str, password: &str) -> String {
        let (status, body) = self.login(username, password).await;
        assert_eq!(status, StatusCode::OK);
        body.and_then(|b| b["token"].as_str().map(str::to_string))
            .expect("login response should carry a token")
    }

    pub async fn validate(&self, token: Option<&str>) -> (StatusCode, Option<Value>) {
        let mut builder = Request::builder().method("GET").uri("/validate-token");
        if let Some(token) = token {
            builder = builder.header(self.config.token_header_key.clone(), token);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }
}

fn credentials_request(uri: &str, username: &str, password: &str) -> Request<Body> {
    let body = serde_json::json!({ "username": username, "password": password });

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
