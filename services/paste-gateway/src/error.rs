// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the paste gateway.

use std::time::Duration;
use thiserror::Error;

/// Failures of the storage backend. Never a quota or validation decision.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Duplicate artifact id: {0}")]
    Duplicate(String),

    #[error("Quota record for {key} still contended after {attempts} attempts")]
    Contention { key: String, attempts: u32 },
}

/// Caller-facing errors produced by the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rate limit exceeded. Try again later.")]
    RateLimited { retry_after: Duration },

    #[error("Access denied for this origin")]
    Forbidden,

    #[error("Paste not found: {0}")]
    NotFound(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(#[from] StoreError),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, GatewayError>;
