// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Append-only paste store.
//!
//! Assigns ids and creation timestamps, rejects blank content, and serves
//! pastes back by id or as a newest-first listing. Nothing here updates or
//! deletes a stored paste.

use crate::backend::ArtifactTable;
use crate::clock::Clock;
use crate::error::StoreError;
use crate::model::{Artifact, ArtifactSummary};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Why a paste could not be created.
#[derive(Debug, Error)]
pub enum CreateError {
    #[error("Content cannot be empty")]
    EmptyContent,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fields supplied by the caller for a new paste.
#[derive(Debug, Clone)]
pub struct NewArtifact {
    pub content: String,
    pub title: String,
    pub language: String,
    pub origin_key: String,
}

/// Paste store over an [`ArtifactTable`].
pub struct ArtifactStore {
    table: Arc<dyn ArtifactTable>,
    clock: Arc<dyn Clock>,
}

impl ArtifactStore {
    pub fn new(table: Arc<dyn ArtifactTable>, clock: Arc<dyn Clock>) -> Self {
        Self { table, clock }
    }

    /// Persist a new paste and return its id.
    ///
    /// Content that is empty after trimming is rejected before anything is
    /// written. The content itself is stored untrimmed.
    pub async fn create(&self, new: NewArtifact) -> Result<String, CreateError> {
        if new.content.trim().is_empty() {
            return Err(CreateError::EmptyContent);
        }

        let artifact = Artifact {
            id: Uuid::new_v4().simple().to_string(),
            title: new.title,
            content: new.content,
            language: new.language,
            created_at: self.clock.now(),
            origin_key: new.origin_key,
        };
        let id = artifact.id.clone();

        info!(
            id = %id,
            language = %artifact.language,
            bytes = artifact.content.len(),
            origin = %artifact.origin_key,
            "Creating paste"
        );
        self.table.insert(artifact).await?;
        Ok(id)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Artifact>, StoreError> {
        self.table.fetch(id).await
    }

    /// The `limit` most recently created pastes, newest first.
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<ArtifactSummary>, StoreError> {
        self.table.recent(limit).await
    }
}
