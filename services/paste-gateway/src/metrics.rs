// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for admission decisions and store activity.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Gateway metrics, registered on a private registry.
#[derive(Clone)]
pub struct GatewayMetrics {
    registry: Registry,
    admissions: IntCounterVec,
    pastes_created: IntCounter,
    store_errors: IntCounterVec,
}

impl GatewayMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let admissions = IntCounterVec::new(
            Opts::new("paste_admissions_total", "Quota decisions by outcome"),
            &["decision"],
        )?;
        let pastes_created =
            IntCounter::new("paste_created_total", "Pastes persisted by the store")?;
        let store_errors = IntCounterVec::new(
            Opts::new("paste_store_errors_total", "Store failures by operation"),
            &["operation"],
        )?;

        registry.register(Box::new(admissions.clone()))?;
        registry.register(Box::new(pastes_created.clone()))?;
        registry.register(Box::new(store_errors.clone()))?;

        Ok(Self {
            registry,
            admissions,
            pastes_created,
            store_errors,
        })
    }

    pub fn record_admission(&self, admitted: bool) {
        let decision = if admitted { "admitted" } else { "rejected" };
        self.admissions.with_label_values(&[decision]).inc();
    }

    pub fn record_created(&self) {
        self.pastes_created.inc();
    }

    pub fn record_store_error(&self, operation: &str) {
        self.store_errors.with_label_values(&[operation]).inc();
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            tracing::error!(error = %e, "Failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
