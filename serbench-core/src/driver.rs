// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Serbench Contributors

//! Benchmark driver: per-target phase machine, warm-up, and measurement.
//!
//! Each (dataset, adapter, mode) target walks the phase machine
//! Init → Isolate → Warmup → Measure → Finalize. Warm-up timing data is
//! discarded; only measurement samples reach the statistics collector.
//! Both representations of the dataset are re-parsed from raw text before
//! every single iteration, warm-up included, so no iteration observes
//! another iteration's object graph.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::adapter::AdapterRegistry;
use crate::error::{BenchResult, PhaseTransitionError};
use crate::fixtures::{Dataset, FixtureRegistry};
use crate::report::TargetReport;
use crate::stats::ThroughputStats;
use crate::types::{AdapterId, Mode, TargetKey};

/// Phases of one benchmark target's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetPhase {
    /// Target selected, nothing prepared yet.
    Init,
    /// Fresh execution context entered.
    Isolate,
    /// Engine reaching steady state; timing discarded.
    Warmup,
    /// Timed iterations recorded.
    Measure,
    /// Terminal: one result emitted from measurement samples.
    Finalize,
}

impl TargetPhase {
    /// Get the phase name for error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::Isolate => "Isolate",
            Self::Warmup => "Warmup",
            Self::Measure => "Measure",
            Self::Finalize => "Finalize",
        }
    }

    /// Check if transition to the target phase is valid. The machine is
    /// linear, except that any phase may finalize early (not-applicable
    /// targets, exhausted wall-clock budgets).
    pub fn can_transition_to(&self, target: TargetPhase) -> bool {
        if *self == Self::Finalize {
            return false;
        }
        if target == Self::Finalize {
            return true;
        }
        matches!(
            (self, target),
            (Self::Init, Self::Isolate)
                | (Self::Isolate, Self::Warmup)
                | (Self::Warmup, Self::Measure)
        )
    }
}

impl std::fmt::Display for TargetPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Phase machine for one benchmark target.
#[derive(Debug)]
pub struct TargetStateMachine {
    key: TargetKey,
    phase: TargetPhase,
    last_transition: Instant,
}

impl TargetStateMachine {
    pub fn new(key: TargetKey) -> Self {
        Self {
            key,
            phase: TargetPhase::Init,
            last_transition: Instant::now(),
        }
    }

    pub fn phase(&self) -> TargetPhase {
        self.phase
    }

    pub fn key(&self) -> &TargetKey {
        &self.key
    }

    /// Attempt to transition to a new phase.
    pub fn transition_to(&mut self, target: TargetPhase) -> Result<(), PhaseTransitionError> {
        if self.phase == TargetPhase::Finalize {
            return Err(PhaseTransitionError::AlreadyFinalized {
                target: self.key.to_string(),
            });
        }
        if !self.phase.can_transition_to(target) {
            return Err(PhaseTransitionError::InvalidTransition {
                target: self.key.to_string(),
                from: self.phase.name(),
                to: target.name(),
            });
        }

        debug!(
            target_key = %self.key,
            from = self.phase.name(),
            to = target.name(),
            elapsed_in_phase_us = self.last_transition.elapsed().as_micros() as u64,
            "phase transition"
        );
        self.phase = target;
        self.last_transition = Instant::now();
        Ok(())
    }
}

/// Stopping rule for one phase: iteration count, wall-clock duration, or
/// both (whichever triggers first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseBounds {
    pub iterations: Option<u64>,
    pub max_duration_ms: Option<u64>,
}

impl PhaseBounds {
    pub fn by_iterations(iterations: u64) -> Self {
        Self {
            iterations: Some(iterations),
            max_duration_ms: None,
        }
    }

    pub fn by_duration_ms(ms: u64) -> Self {
        Self {
            iterations: None,
            max_duration_ms: Some(ms),
        }
    }

    /// Whether at least one bound is set.
    pub fn is_bounded(&self) -> bool {
        self.iterations.is_some() || self.max_duration_ms.is_some()
    }

    /// First bound reached wins. A phase with no bounds at all runs zero
    /// iterations; configuration validation rejects that upstream.
    fn reached(&self, done: u64, elapsed: Duration) -> bool {
        if !self.is_bounded() {
            return true;
        }
        if let Some(limit) = self.iterations {
            if done >= limit {
                return true;
            }
        }
        if let Some(ms) = self.max_duration_ms {
            if elapsed >= Duration::from_millis(ms) {
                return true;
            }
        }
        false
    }
}

/// Driver-level timing configuration, shared by every target in a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DriverConfig {
    pub warmup: PhaseBounds,
    pub measure: PhaseBounds,
    /// Wall-clock budget across warm-up and measurement combined.
    pub target_budget_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            warmup: PhaseBounds {
                iterations: Some(20),
                max_duration_ms: Some(2_000),
            },
            measure: PhaseBounds {
                iterations: Some(100),
                max_duration_ms: Some(2_000),
            },
            target_budget_ms: 30_000,
        }
    }
}

/// Which targets a run covers: the cross product of datasets, adapters,
/// and modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunPlan {
    pub datasets: Vec<String>,
    pub adapters: Vec<AdapterId>,
    pub modes: Vec<Mode>,
}

impl RunPlan {
    /// Expand the plan into individual target keys, dataset-major.
    pub fn targets(&self) -> Vec<TargetKey> {
        let mut keys = Vec::new();
        for dataset in &self.datasets {
            for adapter in &self.adapters {
                for mode in &self.modes {
                    keys.push(TargetKey::new(dataset.clone(), adapter.clone(), *mode));
                }
            }
        }
        keys
    }
}

/// The benchmark driver. Sole owner of run-level timing state; targets
/// execute strictly sequentially.
pub struct Driver<'a> {
    fixtures: &'a FixtureRegistry,
    adapters: &'a AdapterRegistry,
    config: DriverConfig,
}

impl<'a> Driver<'a> {
    pub fn new(
        fixtures: &'a FixtureRegistry,
        adapters: &'a AdapterRegistry,
        config: DriverConfig,
    ) -> Self {
        Self {
            fixtures,
            adapters,
            config,
        }
    }

    /// Run a single target through its full phase lifecycle.
    ///
    /// Returns `Err` only for dataset-level failures (unknown fixture,
    /// parse error); adapter failures finalize as a failed entry so
    /// sibling targets proceed.
    pub fn run_target(&self, key: &TargetKey) -> BenchResult<TargetReport> {
        let mut machine = TargetStateMachine::new(key.clone());

        let Some(adapter) = self.adapters.get(&key.adapter) else {
            machine.transition_to(TargetPhase::Finalize)?;
            return Ok(TargetReport::failed(key.clone(), "adapter not registered"));
        };

        if !adapter.capabilities().supports(key.mode) {
            debug!(target_key = %key, "mode not supported, skipping");
            machine.transition_to(TargetPhase::Finalize)?;
            return Ok(TargetReport::not_applicable(key.clone()));
        }

        machine.transition_to(TargetPhase::Isolate)?;
        let budget = Duration::from_millis(self.config.target_budget_ms);
        let run_started = Instant::now();

        // Warm-up: same fresh-dataset policy as measurement, all timing
        // discarded.
        machine.transition_to(TargetPhase::Warmup)?;
        let warmup_started = Instant::now();
        let mut warmed = 0u64;
        loop {
            if self.config.warmup.reached(warmed, warmup_started.elapsed()) {
                break;
            }
            if run_started.elapsed() >= budget {
                warn!(target_key = %key, "wall-clock budget exhausted during warm-up");
                machine.transition_to(TargetPhase::Finalize)?;
                return Ok(TargetReport::success(
                    key.clone(),
                    ThroughputStats::from_samples(&[]),
                    None,
                ));
            }

            let dataset = self.fixtures.load(&key.dataset)?;
            if let Err(e) = invoke(adapter, key.mode, &dataset) {
                machine.transition_to(TargetPhase::Finalize)?;
                return Ok(TargetReport::failed(key.clone(), e.to_string()));
            }
            warmed += 1;
        }

        // Measurement: every iteration's elapsed time is recorded. Dataset
        // setup happens outside the timed window.
        machine.transition_to(TargetPhase::Measure)?;
        let measure_started = Instant::now();
        let mut samples: Vec<u64> = Vec::new();
        let mut payload_bytes: Option<u64> = None;
        loop {
            if self
                .config
                .measure
                .reached(samples.len() as u64, measure_started.elapsed())
            {
                break;
            }
            if run_started.elapsed() >= budget {
                warn!(target_key = %key, "wall-clock budget exhausted during measurement");
                break;
            }

            let dataset = self.fixtures.load(&key.dataset)?;
            let timer = Instant::now();
            let output = invoke(adapter, key.mode, &dataset);
            let elapsed = timer.elapsed();

            match output {
                Ok(text) => {
                    if payload_bytes.is_none() {
                        payload_bytes = Some(text.len() as u64);
                    }
                    samples.push(elapsed.as_nanos() as u64);
                }
                Err(e) => {
                    machine.transition_to(TargetPhase::Finalize)?;
                    return Ok(TargetReport::failed(key.clone(), e.to_string()));
                }
            }
        }

        machine.transition_to(TargetPhase::Finalize)?;
        let stats = ThroughputStats::from_samples(&samples);
        debug!(
            target_key = %key,
            iterations = stats.iterations,
            ops_per_sec = ?stats.ops_per_sec,
            "target finalized"
        );
        Ok(TargetReport::success(key.clone(), stats, payload_bytes))
    }

    /// Run every target of a plan sequentially, in this process.
    ///
    /// A dataset that fails to load aborts only that dataset's targets;
    /// the matrix continues with the remaining datasets, and every
    /// requested target appears in the output with a status.
    pub fn run_matrix(&self, plan: &RunPlan) -> Vec<TargetReport> {
        let mut entries = Vec::new();

        for dataset in &plan.datasets {
            // Probe once so a broken fixture fails the whole dataset up
            // front instead of once per target.
            if let Err(e) = self.fixtures.load(dataset) {
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
                    match self.run_target(&key) {
                        Ok(report) => entries.push(report),
                        Err(e) => entries.push(TargetReport::failed(key, e.to_string())),
                    }
                }
            }
        }

        entries
    }
}

fn invoke(
    adapter: &dyn crate::adapter::SerializerAdapter,
    mode: Mode,
    dataset: &Dataset,
) -> BenchResult<String> {
    match mode {
        Mode::Typed => adapter.serialize_typed(&dataset.typed),
        Mode::Generic => adapter.serialize_generic(&dataset.generic),
    }
}
