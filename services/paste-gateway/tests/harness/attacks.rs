// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Abuse simulation patterns for quota testing.

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of paste submissions
    pub total_requests: usize,
    /// Number of unique caller IPs to spread requests over
    pub unique_ips: usize,
    /// Submissions in flight at once
    pub concurrency: usize,
    /// Fraction of submissions with blank content (0.0-1.0)
    pub blank_ratio: f64,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            unique_ips: 1,
            concurrency: 16,
            blank_ratio: 0.0,
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// Single IP flood - many concurrent writes from one caller.
    pub fn single_ip_flood() -> Self {
        Self {
            total_requests: 200,
            unique_ips: 1,
            concurrency: 64,
            ..Default::default()
        }
    }

    /// Distributed flood - many callers, a few writes each.
    pub fn distributed_flood() -> Self {
        Self {
            total_requests: 500,
            unique_ips: 100,
            concurrency: 32,
            ..Default::default()
        }
    }

    /// Blank spray - empty pastes that still burn quota.
    pub fn blank_spray() -> Self {
        Self {
            total_requests: 60,
            unique_ips: 2,
            concurrency: 16,
            blank_ratio: 1.0,
        }
    }

    /// Mixed traffic - a third of submissions are blank.
    pub fn mixed_traffic() -> Self {
        Self {
            total_requests: 90,
            unique_ips: 3,
            concurrency: 12,
            blank_ratio: 0.34,
        }
    }

    /// Writes the quota should let through for a per-caller `limit`.
    pub fn expected_admissions(&self, limit: usize) -> usize {
        let ips = self.unique_ips.max(1);
        (0..ips)
            .map(|ip| {
                let per_ip = self.total_requests / ips + usize::from(ip < self.total_requests % ips);
                per_ip.min(limit)
            })
            .sum()
    }
}

/// Deterministic "random" choice based on index and ratio.
pub fn rand_bool(ratio: f64, index: usize) -> bool {
    if ratio >= 1.0 {
        true
    } else if ratio <= 0.0 {
        false
    } else {
        (index as f64 * 0.618033988749895) % 1.0 < ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_admissions() {
        let flood = AttackConfig::single_ip_flood();
        assert_eq!(flood.expected_admissions(10), 10);

        let distributed = AttackConfig::distributed_flood();
        // 5 requests per IP, limit 3 -> 3 each
        assert_eq!(distributed.expected_admissions(3), 300);
        assert_eq!(distributed.expected_admissions(10), 500);
    }

    #[test]
    fn test_rand_bool_extremes() {
        assert!((0..10).all(|i| rand_bool(1.0, i)));
        assert!((0..10).all(|i| !rand_bool(0.0, i)));
    }
}
