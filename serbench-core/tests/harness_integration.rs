// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Serbench Contributors

//! End-to-end integration tests for the benchmark harness.
//!
//! These run the real engines over the built-in corpora with small
//! iteration counts and verify the cross-cutting properties: round-trip
//! equivalence of the typed and generic paths, complete reporting of the
//! target matrix, and throughput ordering by payload size.

use serbench_core::adapter::AdapterConfig;
use serbench_core::config::builtin_adapter_ids;
use serbench_core::driver::PhaseBounds;
use serbench_core::fixtures::BUILTIN_FIXTURES;
use serbench_core::report::render_table;
use serbench_core::{
    AdapterRegistry, Driver, DriverConfig, FixtureRegistry, Mode, RunPlan, RunReport, TargetKey,
    TargetStatus,
};

fn quick_driver_config(measure_iterations: u64) -> DriverConfig {
    DriverConfig {
        warmup: PhaseBounds::by_iterations(2),
        measure: PhaseBounds::by_iterations(measure_iterations),
        target_budget_ms: 60_000,
    }
}

#[test]
fn test_full_matrix_produces_a_result_for_every_target() {
    let fixtures = FixtureRegistry::with_builtins();
    let adapters = AdapterRegistry::with_builtin_engines(AdapterConfig::default());
    let driver = Driver::new(&fixtures, &adapters, quick_driver_config(3));

    let plan = RunPlan {
        datasets: BUILTIN_FIXTURES.iter().map(|s| s.to_string()).collect(),
        adapters: builtin_adapter_ids(),
        modes: Mode::ALL.to_vec(),
    };

    let entries = driver.run_matrix(&plan);
    assert_eq!(entries.len(), 4 * 3 * 2);
    for entry in &entries {
        assert_eq!(
            entry.status,
            TargetStatus::Success,
            "target {} did not succeed: {:?}",
            entry.key,
            entry.error
        );
        let stats = entry.stats.as_ref().unwrap();
        assert_eq!(stats.iterations, 3);
        assert!(stats.is_defined());
        assert!(entry.payload_bytes.unwrap() > 0);
    }

    // Keys are unique per run.
    let mut keys: Vec<&TargetKey> = entries.iter().map(|e| &e.key).collect();
    let before = keys.len();
    keys.sort_by_key(|k| k.to_string());
    keys.dedup_by_key(|k| k.to_string());
    assert_eq!(keys.len(), before);
}

#[test]
fn test_typed_and_generic_paths_agree_for_every_engine_and_corpus() {
    let fixtures = FixtureRegistry::with_builtins();
    let adapters = AdapterRegistry::with_builtin_engines(AdapterConfig::default());

    for name in BUILTIN_FIXTURES {
        let dataset = fixtures.load(name).unwrap();
        for id in builtin_adapter_ids() {
            let adapter = adapters.get(&id).unwrap();
            let typed_out = adapter.serialize_typed(&dataset.typed).unwrap();
            let reparsed: serde_json::Value = serde_json::from_str(&typed_out).unwrap();
            assert_eq!(
                reparsed, dataset.generic,
                "typed path of '{}' over '{}' diverges from generic representation",
                id, name
            );
        }
    }
}

#[test]
fn test_larger_corpus_does_not_out_throughput_smaller() {
    let fixtures = FixtureRegistry::with_builtins();
    let adapters = AdapterRegistry::with_builtin_engines(AdapterConfig::default());
    let driver = Driver::new(&fixtures, &adapters, quick_driver_config(30));

    // 'citys' is roughly 30x the raw bytes of 'user'.
    let small_raw = fixtures.raw("user").unwrap().len();
    let large_raw = fixtures.raw("citys").unwrap().len();
    assert!(large_raw > 20 * small_raw, "corpus size spread regressed");

    let adapter = builtin_adapter_ids().remove(0);
    let small = driver
        .run_target(&TargetKey::new("user", adapter.clone(), Mode::Typed))
        .unwrap();
    let large = driver
        .run_target(&TargetKey::new("citys", adapter, Mode::Typed))
        .unwrap();

    let small_ops = small.stats.unwrap().ops_per_sec.unwrap();
    let large_ops = large.stats.unwrap().ops_per_sec.unwrap();
    assert!(
        large_ops <= small_ops,
        "large corpus out-throughputs small: {} vs {} ops/s",
        large_ops,
        small_ops
    );
}

#[test]
fn test_report_table_lists_the_whole_matrix() {
    let fixtures = FixtureRegistry::with_builtins();
    let adapters = AdapterRegistry::with_builtin_engines(AdapterConfig::default());
    let driver = Driver::new(&fixtures, &adapters, quick_driver_config(2));

    let plan = RunPlan {
        datasets: vec!["user".to_string(), "request".to_string()],
        adapters: builtin_adapter_ids(),
        modes: Mode::ALL.to_vec(),
    };

    let mut report = RunReport::new();
    for entry in driver.run_matrix(&plan) {
        report.push(entry);
    }

    let table = render_table(&report);
    for dataset in ["user", "request"] {
        for mode in Mode::ALL {
            assert!(
                table.contains(&format!("dataset={} mode={}", dataset, mode)),
                "missing group header for {}/{} in:\n{}",
                dataset,
                mode,
                table
            );
        }
    }
    for id in builtin_adapter_ids() {
        assert!(table.contains(id.as_str()));
    }
}

#[test]
fn test_run_log_written_and_reloadable() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("run.json");

    let fixtures = FixtureRegistry::with_builtins();
    let adapters = AdapterRegistry::with_builtin_engines(AdapterConfig::default());
    let driver = Driver::new(&fixtures, &adapters, quick_driver_config(2));

    let plan = RunPlan {
        datasets: vec!["user".to_string()],
        adapters: builtin_adapter_ids(),
        modes: vec![Mode::Generic],
    };

    let mut report = RunReport::new();
    for entry in driver.run_matrix(&plan) {
        report.push(entry);
    }
    report.write_json(&log_path).unwrap();

    let loaded: RunReport =
        serde_json::from_str(&std::fs::read_to_string(&log_path).unwrap()).unwrap();
    assert_eq!(loaded.entries.len(), 3);
    assert!(loaded.datasets_with_results().contains("user"));
}
