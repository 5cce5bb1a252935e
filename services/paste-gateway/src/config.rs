// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the paste gateway.
//!
//! Defaults match the hosted service: 5000 writes per caller per hour, open
//! reads, five second store timeout.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Configuration for the paste gateway service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Public URL of the site, echoed by `/public`
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Write quota configuration
    #[serde(default)]
    pub quota: QuotaConfig,

    /// Read access configuration
    #[serde(default)]
    pub access: AccessConfig,

    /// Storage configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Per-caller write quota.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Writes admitted per caller per window (default: 5000)
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Window length in seconds (default: 3600)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

/// Read access and caller identification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Origins allowed to read pastes. Empty disables the check.
    #[serde(default)]
    pub origin_allow_list: Vec<String>,

    /// Derive the caller key from X-Forwarded-For and friends (default: true)
    #[serde(default = "default_true")]
    pub trust_forwarded_headers: bool,
}

/// Storage backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Upper bound on a single store operation in milliseconds (default: 5000)
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,

    /// How often expired quota rows are purged, in seconds (default: 300)
    #[serde(default = "default_gc_interval_secs")]
    pub gc_interval_secs: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_site_url() -> String {
    "https://voidbin.vercel.app".to_string()
}

fn default_limit() -> u32 {
    5000
}

fn default_window_secs() -> u64 {
    3600
}

fn default_operation_timeout_ms() -> u64 {
    5000
}

fn default_gc_interval_secs() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            site_url: default_site_url(),
            quota: QuotaConfig::default(),
            access: AccessConfig::default(),
            store: StoreConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            origin_allow_list: Vec::new(),
            trust_forwarded_headers: default_true(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            operation_timeout_ms: default_operation_timeout_ms(),
            gc_interval_secs: default_gc_interval_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl QuotaConfig {
    /// Get the quota window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs.max(1))
    }
}

impl StoreConfig {
    /// Get the per-operation timeout
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    /// Get the quota purge interval
    pub fn gc_interval(&self) -> Duration {
        Duration::from_secs(self.gc_interval_secs.max(1))
    }
}

impl Config {
    /// Load configuration from environment variables on top of the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            site_url: lookup("SITE_URL").unwrap_or(defaults.site_url),
            quota: QuotaConfig {
                limit: parse_or(&lookup, "PASTE_LIMIT", defaults.quota.limit),
                window_secs: parse_or(&lookup, "PASTE_WINDOW_SECS", defaults.quota.window_secs),
            },
            access: AccessConfig {
                origin_allow_list: lookup("ORIGIN_ALLOW_LIST")
                    .map(|v| {
                        v.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
                trust_forwarded_headers: parse_or(
                    &lookup,
                    "TRUST_FORWARDED_HEADERS",
                    defaults.access.trust_forwarded_headers,
                ),
            },
            store: StoreConfig {
                operation_timeout_ms: parse_or(
                    &lookup,
                    "STORE_TIMEOUT_MS",
                    defaults.store.operation_timeout_ms,
                ),
                gc_interval_secs: parse_or(
                    &lookup,
                    "QUOTA_GC_INTERVAL_SECS",
                    defaults.store.gc_interval_secs,
                ),
            },
            metrics: MetricsConfig {
                enabled: parse_or(&lookup, "METRICS_ENABLED", defaults.metrics.enabled),
                ..defaults.metrics
            },
        }
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(var = name, value = %raw, "Unparsable value, using default");
            default
        }),
        None => default,
    }
}
