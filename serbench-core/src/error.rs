// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Serbench Contributors

//! Custom error types for the benchmark harness.
//!
//! All errors are explicit enum variants - no `Box<dyn Error>` in library
//! code. Failures are scoped to the smallest unit that caused them: a
//! fixture error aborts one dataset's matrix, an adapter error marks one
//! target as failed, and neither cascades to sibling targets.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the serbench harness.
#[derive(Debug, Error)]
pub enum BenchError {
    // =========================================================================
    // Dataset Errors - Fatal for the Affected Dataset Only
    // =========================================================================
    #[error("Fixture not found: {name}")]
    ResourceNotFound { name: String },

    #[error("Fixture parse error in '{name}': {message}")]
    FixtureParse { name: String, message: String },

    // =========================================================================
    // Adapter Errors - Fatal for the Affected Target Only
    // =========================================================================
    #[error("Adapter '{adapter}' failed: {message}")]
    AdapterFailure { adapter: String, message: String },

    #[error("Adapter already registered: {id}")]
    AdapterAlreadyRegistered { id: String },

    // =========================================================================
    // Driver Errors
    // =========================================================================
    #[error("Invalid phase transition: {0}")]
    PhaseTransition(#[from] PhaseTransitionError),

    // =========================================================================
    // Configuration Errors - Fail-Fast at Startup
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {context} - {message}")]
    Serialization {
        context: &'static str,
        message: String,
    },

    #[error("Worker protocol error: {message}")]
    WorkerProtocol { message: String },
}

/// Invalid transition in the per-target benchmark phase machine.
#[derive(Debug, Error)]
pub enum PhaseTransitionError {
    #[error("Cannot transition from {from} to {to} for target {target}")]
    InvalidTransition {
        target: String,
        from: &'static str,
        to: &'static str,
    },

    #[error("Target {target} is already finalized")]
    AlreadyFinalized { target: String },
}

/// Configuration validation errors; any of these prevents the run from
/// starting.
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("No datasets selected for the run")]
    EmptyDatasets,

    #[error("No adapters selected for the run")]
    EmptyAdapters,

    #[error("Phase '{phase}' has neither an iteration count nor a duration bound")]
    UnboundedPhase { phase: &'static str },

    #[error("Unknown serialization mode: {value} (expected 'typed' or 'generic')")]
    UnknownMode { value: String },

    #[error("Unknown isolation mode: {value} (expected 'process' or 'in-process')")]
    UnknownIsolation { value: String },

    #[error("Unknown domain shape for fixture '{name}'")]
    UnknownShape { name: String },
}

/// Result type alias using BenchError.
pub type BenchResult<T> = Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_not_found_display() {
        let err = BenchError::ResourceNotFound {
            name: "citys".to_string(),
        };
        assert!(err.to_string().contains("citys"));
    }

    #[test]
    fn test_phase_transition_error_chain() {
        let phase_err = PhaseTransitionError::InvalidTransition {
            target: "citys/serde-json/typed".to_string(),
            from: "Finalize",
            to: "Warmup",
        };
        let bench_err: BenchError = phase_err.into();
        assert!(matches!(bench_err, BenchError::PhaseTransition(_)));
        assert!(bench_err.to_string().contains("Finalize"));
    }

    #[test]
    fn test_config_validation_error_chain() {
        let cfg_err = ConfigValidationError::UnknownMode {
            value: "binary".to_string(),
        };
        let bench_err: BenchError = cfg_err.into();
        assert!(matches!(bench_err, BenchError::InvalidConfig(_)));
    }
}
