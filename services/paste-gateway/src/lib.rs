// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Paste Gateway
//!
//! Accepts short text pastes from untrusted callers and serves them back by
//! id, protecting the store with a per-caller write quota:
//!
//! - Fixed-window quota per caller key (5000 writes per hour default)
//! - Atomic per-key admission via versioned compare-and-swap
//! - Append-only paste store with read-your-write guarantees
//! - Optional referer allow-list for reads
//! - Bounded store operations with opaque 500s on failure

pub mod access;
pub mod artifacts;
pub mod backend;
pub mod clock;
pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod ledger;
pub mod metrics;
pub mod model;

pub use config::Config;
pub use error::{GatewayError, StoreError};
pub use gateway::Gateway;
pub use ledger::{Admission, QuotaLedger, QuotaPolicy};
