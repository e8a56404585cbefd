// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Serbench Contributors

//! Timing and statistics collection over measurement samples.
//!
//! Samples arrive only from the measurement phase; warm-up timing data is
//! discarded before it ever reaches this module. Zero samples is a defined
//! degenerate result (undefined throughput), not a crash.

use serde::{Deserialize, Serialize};

/// Throughput and dispersion statistics for one finalized target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputStats {
    /// Number of measured iterations.
    pub iterations: u64,
    /// Total measured time in nanoseconds.
    pub total_ns: u64,
    /// Mean throughput in operations per second. `None` when no
    /// iterations were measured.
    pub ops_per_sec: Option<f64>,
    /// Minimum per-iteration time in nanoseconds.
    pub min_ns: u64,
    /// Maximum per-iteration time in nanoseconds.
    pub max_ns: u64,
    /// Arithmetic mean per-iteration time in nanoseconds.
    pub mean_ns: f64,
    /// Variance of per-iteration times in ns².
    pub variance_ns2: f64,
    /// Standard deviation of per-iteration times in nanoseconds.
    pub std_dev_ns: f64,
}

impl ThroughputStats {
    /// Calculate statistics from per-iteration elapsed times (nanoseconds).
    pub fn from_samples(samples: &[u64]) -> Self {
        if samples.is_empty() {
            return Self {
                iterations: 0,
                total_ns: 0,
                ops_per_sec: None,
                min_ns: 0,
                max_ns: 0,
                mean_ns: 0.0,
                variance_ns2: 0.0,
                std_dev_ns: 0.0,
            };
        }

        let len = samples.len();
        let total_ns: u64 = samples.iter().sum();
        let mean_ns = total_ns as f64 / len as f64;
        let min_ns = *samples.iter().min().expect("non-empty");
        let max_ns = *samples.iter().max().expect("non-empty");

        let variance_ns2: f64 = samples
            .iter()
            .map(|&x| {
                let diff = x as f64 - mean_ns;
                diff * diff
            })
            .sum::<f64>()
            / len as f64;
        let std_dev_ns = variance_ns2.sqrt();

        // Mean throughput = iterations / total measured time.
        let ops_per_sec = if total_ns > 0 {
            Some(len as f64 / (total_ns as f64 / 1_000_000_000.0))
        } else {
            None
        };

        Self {
            iterations: len as u64,
            total_ns,
            ops_per_sec,
            min_ns,
            max_ns,
            mean_ns,
            variance_ns2,
            std_dev_ns,
        }
    }

    /// Whether a throughput figure exists for this target.
    pub fn is_defined(&self) -> bool {
        self.ops_per_sec.is_some()
    }

    /// Throughput column for the report table.
    pub fn format_ops(&self) -> String {
        match self.ops_per_sec {
            Some(ops) if ops >= 10_000.0 => format!("{:.0}", ops),
            Some(ops) => format!("{:.1}", ops),
            None => "undefined".to_string(),
        }
    }

    /// Format a nanosecond figure in human-readable form.
    pub fn format_ns(ns: f64) -> String {
        if ns < 1_000.0 {
            format!("{:.0}ns", ns)
        } else if ns < 1_000_000.0 {
            format!("{:.2}µs", ns / 1_000.0)
        } else if ns < 1_000_000_000.0 {
            format!("{:.2}ms", ns / 1_000_000.0)
        } else {
            format!("{:.2}s", ns / 1_000_000_000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_from_samples() {
        let stats = ThroughputStats::from_samples(&[100, 200, 300, 400, 500]);
        assert_eq!(stats.iterations, 5);
        assert_eq!(stats.total_ns, 1500);
        assert_eq!(stats.min_ns, 100);
        assert_eq!(stats.max_ns, 500);
        assert!((stats.mean_ns - 300.0).abs() < f64::EPSILON);
        // Population variance of 100..500 step 100 is 20000 ns².
        assert!((stats.variance_ns2 - 20_000.0).abs() < 0.01);
        assert!((stats.std_dev_ns - 20_000.0_f64.sqrt()).abs() < 0.01);

        // 5 ops in 1500ns.
        let ops = stats.ops_per_sec.unwrap();
        assert!((ops - 5.0 / 1.5e-6).abs() / ops < 1e-9);
    }

    #[test]
    fn test_zero_samples_is_undefined_not_a_crash() {
        let stats = ThroughputStats::from_samples(&[]);
        assert_eq!(stats.iterations, 0);
        assert!(!stats.is_defined());
        assert_eq!(stats.format_ops(), "undefined");
    }

    #[test]
    fn test_constant_samples_have_zero_dispersion() {
        let stats = ThroughputStats::from_samples(&[250, 250, 250, 250]);
        assert_eq!(stats.variance_ns2, 0.0);
        assert_eq!(stats.std_dev_ns, 0.0);
    }

    #[test]
    fn test_format_ns() {
        assert_eq!(ThroughputStats::format_ns(500.0), "500ns");
        assert_eq!(ThroughputStats::format_ns(1_500.0), "1.50µs");
        assert_eq!(ThroughputStats::format_ns(1_500_000.0), "1.50ms");
        assert_eq!(ThroughputStats::format_ns(1_500_000_000.0), "1.50s");
    }
}
