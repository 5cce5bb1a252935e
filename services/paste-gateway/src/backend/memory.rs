// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! In-process backend.
//!
//! Quota rows sit in a sharded `DashMap`; a compare-and-swap locks only the
//! shard holding the key. Row versions come from one backend-wide counter, so
//! a key that is purged and re-inserted never reuses a version a stale reader
//! may still hold. Artifacts sit behind a single `RwLock` with an id
//! index and a `(created_at, sequence)` ordering index for listings.

use super::{ArtifactTable, QuotaTable, SwapOutcome};
use crate::error::StoreError;
use crate::model::{Artifact, ArtifactSummary, QuotaRecord, Versioned};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct ArtifactRows {
    by_id: HashMap<String, Artifact>,
    /// (created_at, insertion sequence) -> id
    by_recency: BTreeMap<(DateTime<Utc>, u64), String>,
    next_seq: u64,
}

/// Thread-safe in-memory tables.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    quotas: DashMap<String, Versioned<QuotaRecord>>,
    /// Last version handed out to any quota row.
    quota_version: AtomicU64,
    artifacts: RwLock<ArtifactRows>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored artifacts.
    pub async fn artifact_count(&self) -> usize {
        self.artifacts.read().await.by_id.len()
    }

    /// Number of stored artifacts created by `origin_key`.
    pub async fn artifact_count_for(&self, origin_key: &str) -> usize {
        self.artifacts
            .read()
            .await
            .by_id
            .values()
            .filter(|a| a.origin_key == origin_key)
            .count()
    }

    /// Number of quota rows currently held.
    pub fn quota_count(&self) -> usize {
        self.quotas.len()
    }

    // Called with the key's shard locked.
    fn next_quota_version(&self) -> u64 {
        self.quota_version.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl QuotaTable for MemoryBackend {
    async fn load(&self, key: &str) -> Result<Option<Versioned<QuotaRecord>>, StoreError> {
        Ok(self.quotas.get(key).map(|row| row.value().clone()))
    }

    async fn compare_and_swap(
        &self,
        expected: Option<u64>,
        record: QuotaRecord,
    ) -> Result<SwapOutcome, StoreError> {
        match self.quotas.entry(record.key.clone()) {
            Entry::Vacant(slot) => {
                if expected.is_some() {
                    // Row vanished (purged) since it was loaded.
                    return Ok(SwapOutcome::Conflict);
                }
                let version = self.next_quota_version();
                slot.insert(Versioned {
                    value: record,
                    version,
                });
                Ok(SwapOutcome::Swapped { version })
            }
            Entry::Occupied(mut slot) => {
                let current = slot.get().version;
                if expected != Some(current) {
                    return Ok(SwapOutcome::Conflict);
                }
                let version = self.next_quota_version();
                slot.insert(Versioned {
                    value: record,
                    version,
                });
                Ok(SwapOutcome::Swapped { version })
            }
        }
    }

    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<usize, StoreError> {
        let start = self.quotas.len();
        self.quotas.retain(|_, row| row.value.window_end > before);
        let purged = start.saturating_sub(self.quotas.len());
        debug!(purged, "Purged expired quota records");
        Ok(purged)
    }
}

#[async_trait]
impl ArtifactTable for MemoryBackend {
    async fn insert(&self, artifact: Artifact) -> Result<(), StoreError> {
        let mut rows = self.artifacts.write().await;
        if rows.by_id.contains_key(&artifact.id) {
            return Err(StoreError::Duplicate(artifact.id));
        }
        let seq = rows.next_seq;
        rows.next_seq += 1;
        rows.by_recency
            .insert((artifact.created_at, seq), artifact.id.clone());
        rows.by_id.insert(artifact.id.clone(), artifact);
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Option<Artifact>, StoreError> {
        Ok(self.artifacts.read().await.by_id.get(id).cloned())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ArtifactSummary>, StoreError> {
        let rows = self.artifacts.read().await;
        Ok(rows
            .by_recency
            .values()
            .rev()
            .filter_map(|id| rows.by_id.get(id))
            .take(limit)
            .map(ArtifactSummary::from)
            .collect())
    }
}
