// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Serbench Contributors

//! Hidden worker subcommand: one isolated target per process.
//!
//! The parent spawns a fresh `serbench worker` for every target so no
//! engine state, allocator behavior, or code-cache effect can leak from
//! one target into another's measurement. The finalized result goes back
//! as a single JSON document on stdout.

use anyhow::Context;
use serbench_core::adapter::AdapterConfig;
use serbench_core::{AdapterRegistry, Driver, FixtureRegistry, TargetReport};
use tracing::debug;

use super::WorkerSpec;

pub fn execute(spec_json: &str) -> anyhow::Result<()> {
    let spec: WorkerSpec =
        serde_json::from_str(spec_json).context("invalid worker spec JSON")?;
    debug!(target_key = %spec.key, "worker starting");

    let fixtures = FixtureRegistry::with_builtins();
    let adapters = AdapterRegistry::with_builtin_engines(AdapterConfig::default());
    let driver = Driver::new(&fixtures, &adapters, spec.driver);

    // Dataset-level errors still produce a report entry; the parent
    // decides how they affect the rest of the matrix.
    let report = match driver.run_target(&spec.key) {
        Ok(report) => report,
        Err(e) => TargetReport::failed(spec.key.clone(), e.to_string()),
    };

    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
