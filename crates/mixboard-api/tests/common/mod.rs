#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use mixboard_api::config::AuthConfig;
use mixboard_api::{AppStateInner, router};
use mixboard_db::Database;

/// The whole API over a private in-memory database.
pub struct TestApp {
    router: Router,
}

pub struct TestUser {
    pub id: String,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Result<Self> {
        let db = Database::open_in_memory()?;
        let auth = AuthConfig::new("integration-test-signing-key", chrono::Duration::hours(1))?;
        Ok(Self {
            router: router(AppStateInner::new(db, &auth)),
        })
    }

    /// Send a raw body. Responses without a body come back as `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };
        Ok((status, value))
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        self.send(method, uri, token, body.map(|b| b.to_string())).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn register(&self, name: &str, email: &str) -> Result<TestUser> {
        let (status, body) = self
            .call(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({ "name": name, "email": email, "password": "correct horse battery" })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {} {}", status, body);

        Ok(TestUser {
            id: body["user"]["id"].as_str().context("user id")?.to_string(),
            token: body["token"].as_str().context("token")?.to_string(),
        })
    }

    /// Create a board as `owner` and return its id.
    pub async fn board(&self, owner: &TestUser, name: &str) -> Result<String> {
        let (status, body) = self.post("/boards", &owner.token, json!({ "name": name })).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create board failed: {} {}", status, body);
        Ok(body["id"].as_str().context("board id")?.to_string())
    }

    pub async fn share(&self, owner: &TestUser, board_id: &str, email: &str, role: &str) -> Result<()> {
        let (status, body) = self
            .post(
                &format!("/boards/{}/collaborators", board_id),
                &owner.token,
                json!({ "email": email, "role": role }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "share failed: {} {}", status, body);
        Ok(())
    }
}

pub fn note(text: &str) -> Value {
    json!({
        "type": "NOTE",
        "position_x": 10,
        "position_y": 20,
        "width": 200,
        "height": 120,
        "data": { "text": text, "color": "yellow" },
    })
}

/// Formatted log output from the current thread, collected while the guard
/// returned by `install` is alive.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let buffer = Self::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || writer.clone())
            .finish();
        (buffer, tracing::subscriber::set_default(subscriber))
    }

    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
