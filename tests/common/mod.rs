//! Common test utilities for exercising the HTTP surface
//!
//! Builds routers around a fixed or file-backed classifier and provides
//! helpers for sending requests and carrying the session cookie between them.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use travel_satisfaction::{
    api::{build_router, AppState},
    config::SessionConfig,
    ml::{Classifier, ModelHandle, ModelMetadata},
    models::FeatureRecord,
    session::SessionManager,
};

/// Classifier that always answers with the same class
pub struct FixedClassifier {
    pub class: i64,
    metadata: ModelMetadata,
}

impl FixedClassifier {
    pub fn new(class: i64) -> Self {
        Self {
            class,
            metadata: ModelMetadata {
                name: "fixed".to_string(),
                version: "test".to_string(),
                n_trees: 0,
                n_classes: 3,
                max_depth: 0,
            },
        }
    }
}

impl Classifier for FixedClassifier {
    fn predict(&self, _record: &FeatureRecord) -> travel_satisfaction::Result<i64> {
        Ok(self.class)
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

pub fn session_manager() -> SessionManager {
    SessionManager::new(&SessionConfig {
        secret_key: "integration-test-secret".to_string(),
        ..SessionConfig::default()
    })
    .unwrap()
}

pub fn app_with_model(model: ModelHandle) -> Router {
    build_router(AppState::new(model, session_manager()))
}

pub fn app_with_class(class: i64) -> Router {
    let model: Arc<dyn Classifier> = Arc::new(FixedClassifier::new(class));
    app_with_model(Some(model))
}

pub fn app_without_model() -> Router {
    app_with_model(None)
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// `name=value` part of the response's `Set-Cookie` header, ready to send back
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}
