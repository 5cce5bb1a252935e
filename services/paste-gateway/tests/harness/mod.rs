// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for the paste gateway.
//!
//! Builds in-process routers over the memory backend and provides load
//! generators and outcome tallies for abuse simulations.

#![allow(dead_code)]

pub mod attacks;
pub mod metrics;

use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use paste_gateway::{
    backend::{ArtifactTable, MemoryBackend, QuotaTable},
    clock::{Clock, ManualClock},
    config::Config,
    gateway::Gateway,
    handlers::{router, AppState},
    metrics::GatewayMetrics,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Fixed start time: 2025-05-20 09:20:00 UTC, forty minutes before a window boundary.
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 20, 9, 20, 0).unwrap()
}

/// Config with the given write limit and everything else default.
pub fn config_with_limit(limit: u32) -> Config {
    let mut config = Config::default();
    config.quota.limit = limit;
    config
}

/// Router over a fresh memory backend and a manual clock.
pub fn build_app(config: Config) -> (Arc<MemoryBackend>, Arc<ManualClock>, Router) {
    let backend = Arc::new(MemoryBackend::new());
    let clock = Arc::new(ManualClock::new(start_time()));
    let router = build_app_over(config, backend.clone(), clock.clone());
    (backend, clock, router)
}

/// Router over any backend.
pub fn build_app_over<B>(config: Config, backend: Arc<B>, clock: Arc<dyn Clock>) -> Router
where
    B: QuotaTable + ArtifactTable + 'static,
{
    let metrics = GatewayMetrics::new().expect("metrics registry");
    let gateway = Gateway::new(&config, backend, clock, metrics);
    router(Arc::new(AppState { gateway, config }))
}

/// `POST /paste` with a JSON body from `ip`.
pub fn post_paste(body: &Value, ip: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/paste")
        .header("content-type", "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// `POST /paste` with a raw body and an optional content type.
pub fn post_raw(body: &str, content_type: Option<&str>, ip: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/paste")
        .header("x-forwarded-for", ip);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// `GET` request with an optional referer.
pub fn get(uri: &str, referer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(referer) = referer {
        builder = builder.header("referer", referer);
    }
    builder.body(Body::empty()).unwrap()
}

/// Response pieces worth asserting on.
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub text: String,
}

/// Drive one request through the router.
pub async fn send(app: &Router, request: Request<Body>) -> Reply {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8_lossy(&bytes).into_owned();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Reply {
        status,
        headers,
        body,
        text,
    }
}
