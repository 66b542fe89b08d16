//! Common test utilities for integration tests
//!
//! Each test app writes its history to its own temporary directory.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use smart_scale_backend::{config::AppConfig, routes, state::AppState};
use std::path::PathBuf;
use tempfile::TempDir;
use tower::ServiceExt;

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    _dir: TempDir,
}

impl TestApp {
    /// Create a new test application with an empty history
    pub fn new() -> Self {
        Self::with_state(|state| state)
    }

    /// Create a test application, customising the state before routing
    pub fn with_state(customise: impl FnOnce(AppState) -> AppState) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = test_config(dir.path().join("user_data").join("user_data.csv"));
        let state = customise(AppState::new(config).expect("Failed to build state"));
        let app = routes::create_router(state.clone());

        Self {
            app,
            state,
            _dir: dir,
        }
    }

    /// Path of the history file
    pub fn history_path(&self) -> PathBuf {
        self.state.measurements().path().to_path_buf()
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        self.send(request).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();

        (status, body_str)
    }
}

fn test_config(csv_path: PathBuf) -> AppConfig {
    let mut config = AppConfig::default();
    config.server.port = 0;
    config.storage.csv_path = csv_path;
    config
}
