// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the paste gateway.
//!
//! This layer owns everything request-shaped: it resolves the caller key from
//! forwarding headers or the peer address, reads the `Referer`, and maps
//! [`GatewayError`] onto status codes. The [`Gateway`] never sees headers.

use crate::config::Config;
use crate::error::GatewayError;
use crate::gateway::{Gateway, PublicInfo, WriteRequest};
use crate::model::{Artifact, ArtifactSummary};
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Path, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Caller key used when no address can be determined.
pub const UNKNOWN_CALLER: &str = "0.0.0.0";

/// Shared application state.
pub struct AppState {
    pub gateway: Gateway,
    pub config: Config,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Paste submission body.
#[derive(Debug, Deserialize)]
pub struct CreatePasteRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Paste creation response.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, code, message, retry_after_secs) = match &self {
            GatewayError::InvalidInput(message) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", message.clone(), None)
            }
            GatewayError::RateLimited { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                self.to_string(),
                Some(whole_seconds_up(*retry_after)),
            ),
            GatewayError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied. Pastes can only be read from the website.".to_string(),
                None,
            ),
            GatewayError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Paste not found".to_string(),
                None,
            ),
            GatewayError::Infrastructure(e) => {
                error!(error = %e, "Store failure while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            code,
            retry_after_secs,
        });
        match retry_after_secs {
            Some(secs) => (status, [(header::RETRY_AFTER, secs.to_string())], body).into_response(),
            None => (status, body).into_response(),
        }
    }
}

/// Seconds a client must wait, rounded up so a retry never lands early.
fn whole_seconds_up(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

/// Resolve the caller key for quota accounting.
///
/// With forwarded headers trusted, the first `X-Forwarded-For` hop wins, then
/// `CF-Connecting-IP`, then `X-Real-IP`. Otherwise, or if none are present,
/// the TCP peer address is used.
pub fn caller_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded: bool) -> String {
    if trust_forwarded {
        let forwarded = header_str(headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        let candidate = forwarded
            .or_else(|| header_str(headers, "cf-connecting-ip"))
            .or_else(|| header_str(headers, "x-real-ip"));
        if let Some(key) = candidate {
            return key.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CALLER.to_string())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn referer(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, header::REFERER.as_str())
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "paste-gateway",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /paste`
pub async fn create_paste(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Json<CreatePasteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), GatewayError> {
    let origin_key = caller_key(
        &headers,
        peer.map(|ConnectInfo(addr)| addr),
        state.config.access.trust_forwarded_headers,
    );
    debug!(origin = %origin_key, "Processing paste submission");

    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            debug!(origin = %origin_key, reason = %rejection.body_text(), "Undecodable paste body");
            return Err(state.gateway.handle_malformed_write(&origin_key).await);
        }
    };

    let id = state
        .gateway
        .handle_write(WriteRequest {
            content: req.content.unwrap_or_default(),
            title: req.title,
            language: req.language,
            origin_key,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// `GET /paste/{id}`
pub async fn get_paste(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Artifact>, GatewayError> {
    let artifact = state.gateway.handle_read(&id, referer(&headers)).await?;
    Ok(Json(artifact))
}

/// `GET /paste`
pub async fn list_pastes(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ArtifactSummary>>, GatewayError> {
    let recent = state.gateway.handle_list_recent(referer(&headers)).await?;
    Ok(Json(recent))
}

/// `GET /public`
pub async fn public_info(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Result<Json<PublicInfo>, GatewayError> {
    let origin_key = caller_key(
        &headers,
        peer.map(|ConnectInfo(addr)| addr),
        state.config.access.trust_forwarded_headers,
    );
    let info = state.gateway.handle_public_info(&origin_key).await?;
    Ok(Json(info))
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.gateway.metrics().render(),
    )
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/paste", post(create_paste).get(list_pastes))
        .route("/paste/:id", get(get_paste))
        .route("/public", get(public_info));

    if state.config.metrics.enabled {
        let path = state.config.metrics.path.clone();
        app = app.route(&path, get(metrics));
    }

    let origins: Vec<HeaderValue> = state
        .config
        .access
        .origin_allow_list
        .iter()
        .filter_map(|o| o.trim().trim_end_matches('/').parse().ok())
        .collect();
    if !origins.is_empty() {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        );
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}
