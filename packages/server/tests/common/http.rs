//! Minimal HTTP client that drives the router in-process.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

/// Response with the body already parsed as JSON (`Value::Null` when empty).
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    /// `code` field of an error body
    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }

    pub fn id(&self) -> String {
        self.body["id"]
            .as_str()
            .expect("response has no id")
            .to_string()
    }
}

#[derive(Clone)]
pub struct ApiClient {
    app: Router,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(app: Router, token: Option<String>) -> Self {
        Self { app, token }
    }

    pub async fn get(&self, uri: &str) -> ApiResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> ApiResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    /// POST without a body
    pub async fn post_empty(&self, uri: &str) -> ApiResponse {
        self.send(Method::POST, uri, None).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> ApiResponse {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> ApiResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = &self.token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        ApiResponse { status, body }
    }
}
