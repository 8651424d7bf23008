//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - An application router over the in-memory store
//! - A scripted AI drafter with fixed replies
//! - Request helpers returning status and JSON body
//! - User registration and login shortcuts

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use feedbackhub_api::app::{build_router, AppState};
use feedbackhub_api::config::{AiConfig, ApiConfig, Config, DatabaseConfig, JwtConfig};
use feedbackhub_shared::ai::{parse_sentiment, parse_tag_suggestions, AiDrafter, AiError};
use feedbackhub_shared::models::feedback::Sentiment;
use feedbackhub_shared::store::memory::MemoryStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse-battery";

/// Drafter with canned replies, shaped like real model output
pub struct ScriptedDrafter;

#[async_trait]
impl AiDrafter for ScriptedDrafter {
    async fn draft_feedback(&self, points: &str) -> Result<String, AiError> {
        Ok(format!("You consistently {}. Keep it up!", points))
    }

    async fn rephrase(&self, text: &str) -> Result<String, AiError> {
        Ok(format!("Constructively: {}", text))
    }

    async fn classify_sentiment(&self, _text: &str) -> Result<Sentiment, AiError> {
        parse_sentiment("Positive.")
    }

    async fn suggest_tags(&self, _s: &str, _a: &str) -> Result<Vec<String>, AiError> {
        Ok(parse_tag_suggestions("teamwork, Communication, Cooking"))
    }
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: "test-secret-key-at-least-32-bytes-long!!".to_string(),
            access_token_minutes: 60,
        },
        ai: AiConfig {
            api_key: None,
            model: "test".to_string(),
            base_url: "http://localhost".to_string(),
        },
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_drafter(Arc::new(ScriptedDrafter))
    }

    pub fn with_drafter(ai: Arc<dyn AiDrafter>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), ai, test_config());

        Self {
            app: build_router(state),
            store,
        }
    }

    /// Sends a request and returns status, headers and raw body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, Bytes) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, headers, bytes)
    }

    /// Sends a request and parses the body as JSON (`null` when empty)
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, _, bytes) = self.send(method, uri, token, body).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("non-JSON body: {}", String::from_utf8_lossy(&bytes))
            })
        };

        (status, value)
    }

    pub async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({"email": email, "password": PASSWORD})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);

        body["access_token"].as_str().unwrap().to_string()
    }

    /// Registers a manager with a team; returns the user and a token
    pub async fn manager(&self, email: &str, team_name: &str) -> (Value, String) {
        let (status, user) = self
            .call(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "full_name": format!("Manager {}", email),
                    "password": PASSWORD,
                    "role": "manager",
                    "team_name": team_name,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {}", user);

        let token = self.login(email).await;
        (user, token)
    }

    pub async fn employee(&self, email: &str) -> (Value, String) {
        let (status, user) = self
            .call(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "full_name": format!("Employee {}", email),
                    "password": PASSWORD,
                    "role": "employee",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {}", user);

        let token = self.login(email).await;
        (user, token)
    }

    /// Manager and one employee already on their team
    pub async fn team(&self) -> ((Value, String), (Value, String)) {
        let manager = self.manager("boss@example.com", "Platform").await;
        let employee = self.employee("dev@example.com").await;

        let uri = format!("/teams/me/members/{}", employee.0["id"].as_str().unwrap());
        let (status, body) = self.call(Method::POST, &uri, Some(&manager.1), None).await;
        assert_eq!(status, StatusCode::OK, "assignment failed: {}", body);

        (manager, employee)
    }
}
