// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window write quota per caller key.
//!
//! Each caller key may perform `limit` admitted writes per window. Windows are
//! aligned to wall-clock multiples of the window length (for the default one
//! hour window, the top of each hour), so a caller's first window may be
//! shorter than a full window.
//!
//! Admission is a read-evaluate-write over one quota row. The write is a
//! versioned compare-and-swap: if another request for the same key committed
//! in between, the swap reports a conflict and the decision is re-evaluated
//! against the fresh row. No admitted write is ever lost or double counted.

use crate::backend::{QuotaTable, SwapOutcome};
use crate::error::StoreError;
use crate::model::QuotaRecord;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound on compare-and-swap rounds for a single admission.
pub const MAX_SWAP_ATTEMPTS: u32 = 256;

/// Quota ceiling and window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    pub limit: u32,
    pub window: Duration,
}

/// Result of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Write may proceed
    Admitted {
        /// Writes left in the current window
        remaining: u32,
        /// When the current window ends
        resets_at: DateTime<Utc>,
    },
    /// Quota for the current window is used up
    Rejected {
        /// When the current window ends
        resets_at: DateTime<Utc>,
    },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted { .. })
    }

    pub fn resets_at(&self) -> DateTime<Utc> {
        match self {
            Admission::Admitted { resets_at, .. } | Admission::Rejected { resets_at } => *resets_at,
        }
    }

    /// Time from `now` until the window resets.
    pub fn retry_after(&self, now: DateTime<Utc>) -> Duration {
        (self.resets_at() - now).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Smallest multiple of `window` since the Unix epoch strictly after `now`.
pub fn align_to_next_boundary(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX).max(1);
    let now_ms = now.timestamp_millis();
    let next_ms = now_ms
        .div_euclid(window_ms)
        .saturating_add(1)
        .saturating_mul(window_ms);
    DateTime::from_timestamp_millis(next_ms).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Per-key admission ledger over a shared quota table.
pub struct QuotaLedger {
    table: Arc<dyn QuotaTable>,
    policy: QuotaPolicy,
}

impl QuotaLedger {
    pub fn new(table: Arc<dyn QuotaTable>, policy: QuotaPolicy) -> Self {
        Self { table, policy }
    }

    pub fn policy(&self) -> QuotaPolicy {
        self.policy
    }

    /// Decide whether `key` may perform one more write at `now`, and record it.
    pub async fn admit(&self, key: &str, now: DateTime<Utc>) -> Result<Admission, StoreError> {
        for attempt in 1..=MAX_SWAP_ATTEMPTS {
            let (expected, mut record) = match self.table.load(key).await? {
                Some(row) => (Some(row.version), row.value),
                None => (
                    None,
                    QuotaRecord {
                        key: key.to_string(),
                        count: 0,
                        window_end: align_to_next_boundary(now, self.policy.window),
                    },
                ),
            };
            let mut dirty = expected.is_none();

            if now >= record.window_end {
                record.count = 0;
                record.window_end = align_to_next_boundary(now, self.policy.window);
                dirty = true;
            }

            let admission = if record.count >= self.policy.limit {
                Admission::Rejected {
                    resets_at: record.window_end,
                }
            } else {
                record.count += 1;
                dirty = true;
                Admission::Admitted {
                    remaining: self.policy.limit - record.count,
                    resets_at: record.window_end,
                }
            };

            // A rejection against an unchanged row needs no write.
            if !dirty {
                debug!(key, count = record.count, "Quota exhausted");
                return Ok(admission);
            }

            match self.table.compare_and_swap(expected, record).await? {
                SwapOutcome::Swapped { .. } => return Ok(admission),
                SwapOutcome::Conflict => {
                    debug!(key, attempt, "Quota row changed underneath, retrying");
                    tokio::task::yield_now().await;
                }
            }
        }

        warn!(key, attempts = MAX_SWAP_ATTEMPTS, "Gave up on contended quota row");
        Err(StoreError::Contention {
            key: key.to_string(),
            attempts: MAX_SWAP_ATTEMPTS,
        })
    }
}
