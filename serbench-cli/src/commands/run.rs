// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Serbench Contributors

//! Run the benchmark matrix.
//!
//! Targets execute strictly sequentially, one isolated execution context
//! at a time. In process isolation mode (the default) every target runs
//! in a freshly spawned copy of this executable; in-process mode runs the
//! driver directly. Either way every requested target ends up in the
//! report with a status.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::Context;
use serbench_core::adapter::AdapterConfig;
use serbench_core::driver::PhaseBounds;
use serbench_core::report::render_table;
use serbench_core::{
    AdapterRegistry, Driver, FixtureRegistry, IsolationMode, Mode, RunConfig, RunPlan, RunReport,
    TargetKey, TargetReport,
};
use tracing::{info, warn};

use super::WorkerSpec;

/// Grace period on top of the target budget before a worker is killed.
const WORKER_KILL_GRACE: Duration = Duration::from_secs(5);

pub struct RunArgs {
    pub config_path: Option<PathBuf>,
    pub datasets: Option<Vec<String>>,
    pub adapters: Option<Vec<String>>,
    pub modes: Option<Vec<String>>,
    pub warmup_iterations: Option<u64>,
    pub warmup_ms: Option<u64>,
    pub iterations: Option<u64>,
    pub duration_ms: Option<u64>,
    pub budget_ms: Option<u64>,
    pub isolation: Option<String>,
    pub log: Option<PathBuf>,
}

pub fn execute(args: RunArgs) -> anyhow::Result<()> {
    let config = build_config(&args)?;

    let fixtures = FixtureRegistry::with_builtins();
    let adapters = AdapterRegistry::with_builtin_engines(AdapterConfig::default());
    adapters.check_date_formats();

    for id in &config.adapters {
        if adapters.get(id).is_none() {
            anyhow::bail!("unknown adapter: {}", id);
        }
    }

    let plan = RunPlan {
        datasets: config.datasets.clone(),
        adapters: config.adapters.clone(),
        modes: config.modes.clone(),
    };

    info!(
        datasets = plan.datasets.len(),
        adapters = plan.adapters.len(),
        modes = plan.modes.len(),
        isolation = %config.isolation,
        "starting benchmark run"
    );

    let mut report = RunReport::new();
    let entries = match config.isolation {
        IsolationMode::InProcess => {
            let driver = Driver::new(&fixtures, &adapters, config.driver);
            driver.run_matrix(&plan)
        }
        IsolationMode::Process => run_process_isolated(&config, &plan, &fixtures)?,
    };
    for entry in entries {
        report.push(entry);
    }

    print!("{}", render_table(&report));

    if let Some(path) = &config.log_path {
        let written = report.write_json(path)?;
        info!(path = %written.display(), "run log written");
    }

    // Success requires at least one dataset with a valid result; a run
    // where every requested fixture failed to load exits nonzero.
    if report.datasets_with_results().is_empty() {
        anyhow::bail!("no dataset produced a valid result");
    }

    Ok(())
}

/// Merge the optional YAML config with CLI flag overrides.
fn build_config(args: &RunArgs) -> anyhow::Result<RunConfig> {
    let mut config = match &args.config_path {
        Some(path) => RunConfig::load_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RunConfig::default(),
    };

    if let Some(datasets) = &args.datasets {
        config.datasets = datasets.clone();
    }
    if let Some(adapters) = &args.adapters {
        config.adapters = adapters
            .iter()
            .map(|id| serbench_core::AdapterId::new(id.clone()))
            .collect::<Result<Vec<_>, _>>()?;
    }
    if let Some(modes) = &args.modes {
        config.modes = modes
            .iter()
            .map(|m| m.parse::<Mode>())
            .collect::<Result<Vec<_>, _>>()?;
    }

    // A phase flag replaces that phase's bounds wholesale, so the flags
    // alone define the stopping rule.
    if args.warmup_iterations.is_some() || args.warmup_ms.is_some() {
        config.driver.warmup = PhaseBounds {
            iterations: args.warmup_iterations,
            max_duration_ms: args.warmup_ms,
        };
    }
    if args.iterations.is_some() || args.duration_ms.is_some() {
        config.driver.measure = PhaseBounds {
            iterations: args.iterations,
            max_duration_ms: args.duration_ms,
        };
    }
    if let Some(budget) = args.budget_ms {
        config.driver.target_budget_ms = budget;
    }
    if let Some(isolation) = &args.isolation {
        config.isolation = isolation.parse::<IsolationMode>()?;
    }
    if args.log.is_some() {
        config.log_path = args.log.clone();
    }

    if config.datasets.is_empty() {
        anyhow::bail!("no datasets selected");
    }
    if config.modes.is_empty() {
        anyhow::bail!("no modes selected");
    }

    Ok(config)
}

/// Run the matrix with one child process per target.
fn run_process_isolated(
    config: &RunConfig,
    plan: &RunPlan,
    fixtures: &FixtureRegistry,
) -> anyhow::Result<Vec<TargetReport>> {
    let mut entries = Vec::new();

    for dataset in &plan.datasets {
        // Probe the fixture once in the parent; a broken fixture aborts
        // this dataset's matrix without spawning workers for it.
        if let Err(e) = fixtures.load(dataset) {
            warn!(dataset = %dataset, error = %e, "dataset failed to load, aborting its matrix");
            for adapter in &plan.adapters {
                for mode in &plan.modes {
                    let key = TargetKey::new(dataset.clone(), adapter.clone(), *mode);
                    entries.push(TargetReport::failed(key, e.to_string()));
                }
            }
            continue;
        }

        for adapter in &plan.adapters {
            for mode in &plan.modes {
                let key = TargetKey::new(dataset.clone(), adapter.clone(), *mode);
                entries.push(spawn_worker(&key, config));
            }
        }
    }

    Ok(entries)
}

/// Spawn one worker process for a target and collect its result.
///
/// A worker that outlives the target budget plus a grace period is killed
/// and the target reported failed; the run never blocks indefinitely.
fn spawn_worker(key: &TargetKey, config: &RunConfig) -> TargetReport {
    let spec = WorkerSpec {
        key: key.clone(),
        driver: config.driver,
    };
    let spec_json = match serde_json::to_string(&spec) {
        Ok(json) => json,
        Err(e) => return TargetReport::failed(key.clone(), format!("spec encoding: {}", e)),
    };

    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(e) => return TargetReport::failed(key.clone(), format!("current_exe: {}", e)),
    };

    let mut child = match Command::new(exe)
        .arg("worker")
        .arg("--spec")
        .arg(&spec_json)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return TargetReport::failed(key.clone(), format!("worker spawn: {}", e)),
    };

    let deadline =
        Instant::now() + Duration::from_millis(config.driver.target_budget_ms) + WORKER_KILL_GRACE;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    warn!(target_key = %key, "worker exceeded budget, killing");
                    let _ = child.kill();
                    let _ = child.wait();
                    return TargetReport::failed(key.clone(), "worker exceeded wall-clock budget");
                }
                std::thread::sleep(Duration::from_millis(25));
            }
            Err(e) => {
                return TargetReport::failed(key.clone(), format!("worker wait: {}", e));
            }
        }
    };

    let mut stdout = String::new();
    if let Some(mut pipe) = child.stdout.take() {
        let _ = pipe.read_to_string(&mut stdout);
    }

    if !status.success() {
        return TargetReport::failed(key.clone(), format!("worker exited with {}", status));
    }

    match serde_json::from_str::<TargetReport>(stdout.trim()) {
        Ok(report) if report.key == *key => report,
        Ok(report) => TargetReport::failed(
            key.clone(),
            format!("worker answered for wrong target: {}", report.key),
        ),
        Err(e) => TargetReport::failed(key.clone(), format!("worker protocol: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_args() -> RunArgs {
        RunArgs {
            config_path: None,
            datasets: None,
            adapters: None,
            modes: None,
            warmup_iterations: None,
            warmup_ms: None,
            iterations: None,
            duration_ms: None,
            budget_ms: None,
            isolation: None,
            log: None,
        }
    }

    #[test]
    fn test_defaults_cover_full_matrix() {
        let config = build_config(&bare_args()).unwrap();
        assert_eq!(config.datasets.len(), 4);
        assert_eq!(config.adapters.len(), 3);
        assert_eq!(config.modes.len(), 2);
        assert_eq!(config.isolation, IsolationMode::Process);
    }

    #[test]
    fn test_flag_overrides_replace_phase_bounds() {
        let mut args = bare_args();
        args.iterations = Some(7);
        args.warmup_ms = Some(250);
        let config = build_config(&args).unwrap();

        assert_eq!(config.driver.measure.iterations, Some(7));
        assert_eq!(config.driver.measure.max_duration_ms, None);
        assert_eq!(config.driver.warmup.iterations, None);
        assert_eq!(config.driver.warmup.max_duration_ms, Some(250));
    }

    #[test]
    fn test_bad_mode_flag_rejected() {
        let mut args = bare_args();
        args.modes = Some(vec!["binary".to_string()]);
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn test_bad_isolation_flag_rejected() {
        let mut args = bare_args();
        args.isolation = Some("thread".to_string());
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn test_config_file_with_flag_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("serbench.yaml");
        std::fs::write(&path, "datasets: [user]\nisolation: in-process\n").unwrap();

        let mut args = bare_args();
        args.config_path = Some(path);
        args.datasets = Some(vec!["repos".to_string()]);
        let config = build_config(&args).unwrap();

        assert_eq!(config.datasets, vec!["repos"]);
        assert_eq!(config.isolation, IsolationMode::InProcess);
    }
}
