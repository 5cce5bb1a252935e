// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Persisted records: pastes and per-caller quota state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Language tag used when the caller does not supply one.
pub const DEFAULT_LANGUAGE: &str = "plaintext";

/// One immutable paste.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: String,
    pub title: String,
    pub content: String,
    pub language: String,
    pub created_at: DateTime<Utc>,
    /// Caller origin; kept for abuse tracing, never returned to readers.
    #[serde(skip_serializing, default)]
    pub origin_key: String,
}

/// Listing projection of an [`Artifact`] without content or origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactSummary {
    pub id: String,
    pub title: String,
    pub language: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Artifact> for ArtifactSummary {
    fn from(artifact: &Artifact) -> Self {
        Self {
            id: artifact.id.clone(),
            title: artifact.title.clone(),
            language: artifact.language.clone(),
            created_at: artifact.created_at,
        }
    }
}

/// Admission state for one caller key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaRecord {
    pub key: String,
    /// Writes admitted in the current window
    pub count: u32,
    /// When the current window expires
    pub window_end: DateTime<Utc>,
}

/// A stored value together with its row version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}
