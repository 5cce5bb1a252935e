// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Referer-based read restriction.
//!
//! When an allow-list is configured, reads must carry a `Referer` whose
//! origin (scheme, host, port) is on the list. An empty list turns the
//! policy off.

use tracing::warn;
use url::{Origin, Url};

/// Read-access policy keyed on the declared referring origin.
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    allowed: Vec<Origin>,
}

impl OriginPolicy {
    /// Build a policy from configured origins. Entries that do not parse as
    /// URLs are skipped with a warning.
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = origins
            .into_iter()
            .filter_map(|entry| {
                let entry = entry.as_ref().trim();
                if entry.is_empty() {
                    return None;
                }
                match Url::parse(entry) {
                    Ok(url) if url.origin().is_tuple() => Some(url.origin()),
                    _ => {
                        warn!(origin = entry, "Ignoring unusable allow-list origin");
                        None
                    }
                }
            })
            .collect();
        Self { allowed }
    }

    /// Policy that lets every read through.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        !self.allowed.is_empty()
    }

    /// Whether a read declaring `referer` may proceed.
    pub fn permits(&self, referer: Option<&str>) -> bool {
        if !self.is_enabled() {
            return true;
        }
        let Some(referer) = referer else {
            return false;
        };
        match Url::parse(referer.trim()) {
            Ok(url) => {
                let origin = url.origin();
                self.allowed.iter().any(|allowed| *allowed == origin)
            }
            Err(_) => false,
        }
    }
}
