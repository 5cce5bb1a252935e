// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Composition of quota admission, origin policy and the paste store.
//!
//! Writes are admitted by the [`QuotaLedger`] before anything else happens,
//! so a request with blank content still consumes a quota slot. Reads skip
//! the ledger and are only subject to the [`OriginPolicy`].
//!
//! Callers pass the caller key and referer explicitly; nothing in here looks
//! at request headers.

use crate::access::OriginPolicy;
use crate::artifacts::{ArtifactStore, CreateError, NewArtifact};
use crate::backend::{ArtifactTable, QuotaTable};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::{GatewayError, Result, StoreError};
use crate::ledger::{Admission, QuotaLedger, QuotaPolicy};
use crate::metrics::GatewayMetrics;
use crate::model::{Artifact, ArtifactSummary, DEFAULT_LANGUAGE};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Page size of the recent-pastes listing.
pub const RECENT_PAGE_SIZE: usize = 10;

/// A paste submission with the caller key already resolved.
#[derive(Debug, Clone)]
pub struct WriteRequest {
    pub content: String,
    pub title: Option<String>,
    pub language: Option<String>,
    pub origin_key: String,
}

/// Body of the informational `/public` endpoint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PublicInfo {
    pub message: String,
    pub made_with: String,
    pub rate_limit: RateLimitInfo,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub limit: u32,
    pub period: String,
    pub per: String,
}

/// Request orchestration over the ledger and the store.
pub struct Gateway {
    ledger: QuotaLedger,
    artifacts: ArtifactStore,
    origin_policy: OriginPolicy,
    clock: Arc<dyn Clock>,
    metrics: GatewayMetrics,
    operation_timeout: Duration,
    site_url: String,
}

impl Gateway {
    /// Wire a gateway over a backend that holds both tables.
    pub fn new<B>(
        config: &Config,
        backend: Arc<B>,
        clock: Arc<dyn Clock>,
        metrics: GatewayMetrics,
    ) -> Self
    where
        B: QuotaTable + ArtifactTable + 'static,
    {
        let quotas: Arc<dyn QuotaTable> = backend.clone();
        let artifacts: Arc<dyn ArtifactTable> = backend;
        Self {
            ledger: QuotaLedger::new(
                quotas,
                QuotaPolicy {
                    limit: config.quota.limit,
                    window: config.quota.window_duration(),
                },
            ),
            artifacts: ArtifactStore::new(artifacts, clock.clone()),
            origin_policy: OriginPolicy::new(&config.access.origin_allow_list),
            clock,
            metrics,
            operation_timeout: config.store.operation_timeout(),
            site_url: config.site_url.clone(),
        }
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }

    /// Admit, validate and store a new paste. Returns the new id.
    pub async fn handle_write(&self, request: WriteRequest) -> Result<String> {
        self.admit(&request.origin_key).await?;

        if request.content.trim().is_empty() {
            info!(origin = %request.origin_key, "Rejected empty paste");
            return Err(GatewayError::InvalidInput(
                "Content cannot be empty".to_string(),
            ));
        }

        let new = NewArtifact {
            content: request.content,
            title: request.title.unwrap_or_default(),
            language: request
                .language
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            origin_key: request.origin_key,
        };

        match self.bounded("create", self.artifacts.create(new)).await? {
            Ok(id) => {
                self.metrics.record_created();
                Ok(id)
            }
            Err(CreateError::EmptyContent) => Err(GatewayError::InvalidInput(
                "Content cannot be empty".to_string(),
            )),
            Err(CreateError::Store(e)) => Err(self.store_failure("create", e)),
        }
    }

    /// Charge a write whose body could not be decoded, then refuse it.
    ///
    /// The quota is consumed exactly as for a well-formed write with bad
    /// content, so undecodable bodies cannot be sent for free.
    pub async fn handle_malformed_write(&self, origin_key: &str) -> GatewayError {
        if let Err(e) = self.admit(origin_key).await {
            return e;
        }
        info!(origin = %origin_key, "Rejected undecodable paste body");
        GatewayError::InvalidInput("Request body must be a JSON object".to_string())
    }

    /// Fetch one paste by id.
    pub async fn handle_read(&self, id: &str, referer: Option<&str>) -> Result<Artifact> {
        self.check_origin(referer)?;

        if id.trim().is_empty() {
            return Err(GatewayError::InvalidInput("Paste ID is required".to_string()));
        }

        match self.bounded("get", self.artifacts.get(id)).await? {
            Ok(Some(artifact)) => Ok(artifact),
            Ok(None) => {
                debug!(id, "Paste not found");
                Err(GatewayError::NotFound(id.to_string()))
            }
            Err(e) => Err(self.store_failure("get", e)),
        }
    }

    /// Summaries of the most recent pastes, newest first.
    pub async fn handle_list_recent(&self, referer: Option<&str>) -> Result<Vec<ArtifactSummary>> {
        self.check_origin(referer)?;

        self.bounded("list", self.artifacts.list_recent(RECENT_PAGE_SIZE))
            .await?
            .map_err(|e| self.store_failure("list", e))
    }

    /// Service banner. Counts against the caller's write quota.
    pub async fn handle_public_info(&self, origin_key: &str) -> Result<PublicInfo> {
        self.admit(origin_key).await?;

        let policy = self.ledger.policy();
        Ok(PublicInfo {
            message: "yes".to_string(),
            made_with: self.site_url.clone(),
            rate_limit: RateLimitInfo {
                limit: policy.limit,
                period: describe_period(policy.window),
                per: "IP address".to_string(),
            },
        })
    }

    async fn admit(&self, origin_key: &str) -> Result<Admission> {
        let now = self.clock.now();
        let admission = self
            .bounded("admit", self.ledger.admit(origin_key, now))
            .await?
            .map_err(|e| self.store_failure("admit", e))?;
        self.metrics.record_admission(admission.is_admitted());

        match admission {
            Admission::Admitted { remaining, .. } => {
                debug!(origin = origin_key, remaining, "Write admitted");
                Ok(admission)
            }
            Admission::Rejected { .. } => {
                let retry_after = admission.retry_after(now);
                info!(
                    origin = origin_key,
                    retry_after_secs = retry_after.as_secs(),
                    "Write rate limited"
                );
                Err(GatewayError::RateLimited { retry_after })
            }
        }
    }

    fn check_origin(&self, referer: Option<&str>) -> Result<()> {
        if self.origin_policy.permits(referer) {
            Ok(())
        } else {
            info!(referer = ?referer, "Read refused by origin policy");
            Err(GatewayError::Forbidden)
        }
    }

    /// Run one store operation under the configured timeout.
    async fn bounded<F>(&self, operation: &'static str, fut: F) -> Result<F::Output>
    where
        F: Future,
    {
        tokio::time::timeout(self.operation_timeout, fut)
            .await
            .map_err(|_| {
                warn!(
                    operation,
                    timeout_ms = self.operation_timeout.as_millis() as u64,
                    "Store operation timed out"
                );
                self.store_failure(operation, StoreError::Timeout(self.operation_timeout))
            })
    }

    fn store_failure(&self, operation: &'static str, err: StoreError) -> GatewayError {
        self.metrics.record_store_error(operation);
        GatewayError::Infrastructure(err)
    }
}

/// Render a window length as words, e.g. "1 hour" or "90 seconds".
pub fn describe_period(window: Duration) -> String {
    let secs = window.as_secs();
    let (amount, unit) = if secs > 0 && secs % 86_400 == 0 {
        (secs / 86_400, "day")
    } else if secs > 0 && secs % 3600 == 0 {
        (secs / 3600, "hour")
    } else if secs > 0 && secs % 60 == 0 {
        (secs / 60, "minute")
    } else {
        (secs, "second")
    };
    if amount == 1 {
        format!("{amount} {unit}")
    } else {
        format!("{amount} {unit}s")
    }
}
