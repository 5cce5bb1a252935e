// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Storage backend seams.
//!
//! The ledger and the artifact store only touch durable state through these
//! traits. Any backend shared across gateway processes (SQL, Redis, ...) must
//! provide the same guarantees as [`MemoryBackend`]:
//!
//! - `QuotaTable::compare_and_swap` is atomic per key and versions strictly
//!   increase, also across a purge and re-insert of the same key, so the
//!   ledger's optimistic loop never commits a stale count.
//! - `ArtifactTable::insert` is visible to every later `fetch`.

mod memory;

pub use memory::MemoryBackend;

use crate::error::StoreError;
use crate::model::{Artifact, ArtifactSummary, QuotaRecord, Versioned};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Outcome of a conditional quota write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// The write was applied; the row now carries `version`.
    Swapped { version: u64 },
    /// Another writer got there first. Nothing was written.
    Conflict,
}

/// Quota rows keyed by caller key.
#[async_trait]
pub trait QuotaTable: Send + Sync {
    /// Read the current row for `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<Versioned<QuotaRecord>>, StoreError>;

    /// Write `record` only if the stored version still equals `expected`.
    ///
    /// `expected = None` inserts only when no row exists for the key.
    async fn compare_and_swap(
        &self,
        expected: Option<u64>,
        record: QuotaRecord,
    ) -> Result<SwapOutcome, StoreError>;

    /// Drop rows whose window ended at or before `before`. Returns how many.
    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<usize, StoreError>;
}

/// Append-only artifact rows keyed by id.
#[async_trait]
pub trait ArtifactTable: Send + Sync {
    /// Persist a new artifact. Fails with [`StoreError::Duplicate`] if the id exists.
    async fn insert(&self, artifact: Artifact) -> Result<(), StoreError>;

    async fn fetch(&self, id: &str) -> Result<Option<Artifact>, StoreError>;

    /// Up to `limit` summaries, newest `created_at` first, later insertions
    /// first on ties.
    async fn recent(&self, limit: usize) -> Result<Vec<ArtifactSummary>, StoreError>;
}
