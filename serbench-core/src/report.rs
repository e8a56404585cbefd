// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Serbench Contributors

//! Benchmark results and the comparison report.
//!
//! Every requested target appears in the final report with a status of
//! success, not-applicable, or failed, so partial failures stay visible.
//! Rendering is a pure function of the result set.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sysinfo::System;

use crate::error::{BenchError, BenchResult};
use crate::stats::ThroughputStats;
use crate::types::{Mode, TargetKey};

/// Outcome of one benchmark target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetStatus {
    Success,
    NotApplicable,
    Failed,
}

impl TargetStatus {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Success => "ok",
            Self::NotApplicable => "n/a",
            Self::Failed => "failed",
        }
    }
}

/// One finalized benchmark result. Immutable once created; the key
/// (dataset, adapter, mode) is unique per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetReport {
    pub key: TargetKey,
    pub status: TargetStatus,
    /// Present only for successful targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ThroughputStats>,
    /// Serialized output size in bytes, from the first measured iteration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_bytes: Option<u64>,
    /// Failure message for failed targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TargetReport {
    pub fn success(key: TargetKey, stats: ThroughputStats, payload_bytes: Option<u64>) -> Self {
        Self {
            key,
            status: TargetStatus::Success,
            stats: Some(stats),
            payload_bytes,
            error: None,
        }
    }

    pub fn not_applicable(key: TargetKey) -> Self {
        Self {
            key,
            status: TargetStatus::NotApplicable,
            stats: None,
            payload_bytes: None,
            error: None,
        }
    }

    pub fn failed(key: TargetKey, message: impl Into<String>) -> Self {
        Self {
            key,
            status: TargetStatus::Failed,
            stats: None,
            payload_bytes: None,
            error: Some(message.into()),
        }
    }
}

/// System information captured at run time, for the run log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub os_version: String,
    pub kernel_version: Option<String>,
    pub cpu_model: String,
    pub cpu_cores: usize,
    pub memory_bytes: u64,
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Complete report for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub system_info: SystemInfo,
    pub entries: Vec<TargetReport>,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            system_info: SystemInfo::collect(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: TargetReport) {
        self.entries.push(entry);
    }

    /// Datasets that produced at least one valid result.
    pub fn datasets_with_results(&self) -> BTreeSet<&str> {
        self.entries
            .iter()
            .filter(|e| e.status == TargetStatus::Success)
            .map(|e| e.key.dataset.as_str())
            .collect()
    }

    /// Write the full report as pretty JSON (the optional run log).
    pub fn write_json(&self, path: impl AsRef<Path>) -> BenchResult<PathBuf> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| BenchError::Io {
            context: "creating run log",
            source: e,
        })?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).map_err(|e| BenchError::Serialization {
            context: "writing run log",
            message: e.to_string(),
        })?;
        Ok(path)
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Render the comparison table, grouped by (dataset, mode), ordered by
/// descending throughput within each group. Successful entries sort
/// first, then not-applicable, then failed.
pub fn render_table(report: &RunReport) -> String {
    let mut out = String::new();

    // Preserve first-seen dataset order from the entries themselves.
    let mut datasets: Vec<&str> = Vec::new();
    for entry in &report.entries {
        if !datasets.contains(&entry.key.dataset.as_str()) {
            datasets.push(&entry.key.dataset);
        }
    }

    for dataset in datasets {
        for mode in Mode::ALL {
            let mut group: Vec<&TargetReport> = report
                .entries
                .iter()
                .filter(|e| e.key.dataset == dataset && e.key.mode == mode)
                .collect();
            if group.is_empty() {
                continue;
            }

            group.sort_by(|a, b| {
                let rank = |e: &TargetReport| match e.status {
                    TargetStatus::Success => 0,
                    TargetStatus::NotApplicable => 1,
                    TargetStatus::Failed => 2,
                };
                rank(a).cmp(&rank(b)).then_with(|| {
                    let ops = |e: &TargetReport| {
                        e.stats.as_ref().and_then(|s| s.ops_per_sec).unwrap_or(0.0)
                    };
                    ops(b).partial_cmp(&ops(a)).unwrap_or(std::cmp::Ordering::Equal)
                })
            });

            let _ = writeln!(out, "dataset={} mode={}", dataset, mode);
            let _ = writeln!(
                out,
                "  {:<12} {:>14} {:>10} {:>10} {:>8}  {}",
                "adapter", "ops/s", "mean", "std dev", "iters", "status"
            );
            for entry in group {
                match (&entry.status, &entry.stats) {
                    (TargetStatus::Success, Some(stats)) => {
                        let _ = writeln!(
                            out,
                            "  {:<12} {:>14} {:>10} {:>10} {:>8}  {}",
                            entry.key.adapter,
                            stats.format_ops(),
                            ThroughputStats::format_ns(stats.mean_ns),
                            ThroughputStats::format_ns(stats.std_dev_ns),
                            stats.iterations,
                            entry.status.label()
                        );
                    }
                    _ => {
                        let detail = entry.error.as_deref().unwrap_or("");
                        let _ = writeln!(
                            out,
                            "  {:<12} {:>14} {:>10} {:>10} {:>8}  {} {}",
                            entry.key.adapter,
                            "-",
                            "-",
                            "-",
                            "-",
                            entry.status.label(),
                            detail
                        );
                    }
                }
            }
            let _ = writeln!(out);
        }
    }

    out
}
