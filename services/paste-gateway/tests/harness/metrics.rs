// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome tallies for abuse simulation results.

use axum::http::StatusCode;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

/// Possible outcomes for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Created,
    RateLimited,
    InvalidInput,
    ServerError,
    Other,
}

impl From<StatusCode> for Outcome {
    fn from(status: StatusCode) -> Self {
        match status {
            StatusCode::CREATED => Outcome::Created,
            StatusCode::TOO_MANY_REQUESTS => Outcome::RateLimited,
            StatusCode::BAD_REQUEST => Outcome::InvalidInput,
            s if s.is_server_error() => Outcome::ServerError,
            _ => Outcome::Other,
        }
    }
}

/// Collects metrics during an attack simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    start_time: Option<Instant>,
    end_time: Option<Instant>,
    outcomes: HashMap<Outcome, usize>,
    /// Requests admitted (created or failed validation) per IP
    admitted_per_ip: HashMap<String, usize>,
    /// Ids returned for created pastes
    ids: Vec<String>,
}

impl AttackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Record one response.
    pub fn record(&mut self, ip: &str, status: StatusCode, id: Option<String>) {
        let outcome = Outcome::from(status);
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        if matches!(outcome, Outcome::Created | Outcome::InvalidInput) {
            *self.admitted_per_ip.entry(ip.to_string()).or_insert(0) += 1;
        }
        if let Some(id) = id {
            self.ids.push(id);
        }
    }

    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Largest number of admissions any single IP received.
    pub fn max_admitted_per_ip(&self) -> usize {
        self.admitted_per_ip.values().copied().max().unwrap_or(0)
    }

    pub fn distinct_ids(&self) -> usize {
        self.ids.iter().collect::<HashSet<_>>().len()
    }

    pub fn duration(&self) -> Duration {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        self.count(Outcome::RateLimited) as f64 / total as f64
    }
}

impl std::fmt::Display for AttackMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Attack Metrics Report ===")?;
        writeln!(f, "Duration:          {} ms", self.duration().as_millis())?;
        writeln!(f, "Total Requests:    {}", self.total_requests())?;
        writeln!(f, "Created:           {}", self.count(Outcome::Created))?;
        writeln!(f, "Rate Limited:      {}", self.count(Outcome::RateLimited))?;
        writeln!(f, "Invalid Input:     {}", self.count(Outcome::InvalidInput))?;
        writeln!(f, "Server Errors:     {}", self.count(Outcome::ServerError))?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate() * 100.0)?;
        writeln!(f, "Max per IP:        {}", self.max_admitted_per_ip())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        let mut metrics = AttackMetrics::new();
        metrics.start();

        metrics.record("10.0.0.1", StatusCode::CREATED, Some("a".to_string()));
        metrics.record("10.0.0.1", StatusCode::CREATED, Some("b".to_string()));
        metrics.record("10.0.0.1", StatusCode::BAD_REQUEST, None);
        metrics.record("10.0.0.1", StatusCode::TOO_MANY_REQUESTS, None);

        metrics.finish();

        assert_eq!(metrics.total_requests(), 4);
        assert_eq!(metrics.count(Outcome::Created), 2);
        assert_eq!(metrics.max_admitted_per_ip(), 3);
        assert_eq!(metrics.distinct_ids(), 2);
        assert!((metrics.block_rate() - 0.25).abs() < 0.01);
    }
}
