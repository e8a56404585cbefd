// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Serbench Contributors

//! Serbench Core Library
//!
//! Harness for measuring and comparing the serialization throughput of
//! interchangeable JSON engines over identical logical datasets.
//!
//! # Architecture
//!
//! - **Dataset Registry** ([`fixtures`]): named fixture corpora, parsed
//!   fresh into a strongly-typed and a generic representation per
//!   iteration.
//! - **Adapter Registry** ([`adapter`], [`adapters`]): every engine behind
//!   one two-method capability contract with a uniform date format.
//! - **Driver** ([`driver`]): per-target phase machine with isolated,
//!   strictly sequential warm-up and measurement windows.
//! - **Statistics** ([`stats`]): throughput and dispersion over
//!   measurement samples only.
//! - **Report** ([`report`]): ordered comparison table and optional JSON
//!   run log.

pub mod adapter;
pub mod adapters;
pub mod config;
pub mod domain;
pub mod driver;
pub mod error;
pub mod fixtures;
pub mod report;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use adapter::{AdapterConfig, AdapterRegistry, Capabilities, DateFormat, SerializerAdapter};
pub use config::RunConfig;
pub use driver::{Driver, DriverConfig, PhaseBounds, RunPlan, TargetPhase};
pub use error::{BenchError, BenchResult};
pub use fixtures::{Dataset, FixtureRegistry};
pub use report::{RunReport, TargetReport, TargetStatus};
pub use stats::ThroughputStats;
pub use types::{AdapterId, IsolationMode, Mode, TargetKey};
