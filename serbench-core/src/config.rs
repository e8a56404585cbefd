// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Serbench Contributors

//! YAML run configuration with strict validation.
//!
//! A run is configured from an optional YAML file plus CLI overrides; any
//! invalid field fails fast before a single target executes.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::driver::{DriverConfig, PhaseBounds};
use crate::error::{BenchError, BenchResult, ConfigValidationError};
use crate::fixtures::BUILTIN_FIXTURES;
use crate::types::{AdapterId, IsolationMode, Mode};

/// Raw configuration as parsed from YAML (before validation).
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRunConfig {
    datasets: Option<Vec<String>>,
    adapters: Option<Vec<String>>,
    modes: Option<Vec<String>>,
    warmup: Option<RawPhaseBounds>,
    measure: Option<RawPhaseBounds>,
    isolation: Option<String>,
    target_budget_ms: Option<u64>,
    log_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPhaseBounds {
    iterations: Option<u64>,
    duration_ms: Option<u64>,
}

/// Validated run configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub datasets: Vec<String>,
    pub adapters: Vec<AdapterId>,
    pub modes: Vec<Mode>,
    pub driver: DriverConfig,
    pub isolation: IsolationMode,
    pub log_path: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            datasets: BUILTIN_FIXTURES.iter().map(|s| s.to_string()).collect(),
            adapters: builtin_adapter_ids(),
            modes: Mode::ALL.to_vec(),
            driver: DriverConfig::default(),
            isolation: IsolationMode::Process,
            log_path: None,
        }
    }
}

/// Identifiers of the built-in engine adapters, in registration order.
pub fn builtin_adapter_ids() -> Vec<AdapterId> {
    ["serde-json", "simd-json", "sonic-rs"]
        .iter()
        .map(|id| AdapterId::new(*id).expect("static ids are valid"))
        .collect()
}

impl RunConfig {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> BenchResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BenchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| BenchError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_str(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_str(content: &str) -> BenchResult<Self> {
        let raw: RawRunConfig =
            serde_yaml::from_str(content).map_err(|e| BenchError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Self::validate(raw)
    }

    fn validate(raw: RawRunConfig) -> BenchResult<Self> {
        let defaults = Self::default();

        let datasets = match raw.datasets {
            None => defaults.datasets,
            Some(names) => {
                if names.is_empty() {
                    return Err(ConfigValidationError::EmptyDatasets.into());
                }
                reject_duplicates("datasets", &names)?;
                names
            }
        };

        let adapters = match raw.adapters {
            None => defaults.adapters,
            Some(ids) => {
                if ids.is_empty() {
                    return Err(ConfigValidationError::EmptyAdapters.into());
                }
                reject_duplicates("adapters", &ids)?;
                ids.into_iter()
                    .map(AdapterId::new)
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        let modes = match raw.modes {
            None => defaults.modes,
            Some(names) => {
                let mut modes = Vec::with_capacity(names.len());
                for name in &names {
                    let mode: Mode = name.parse().map_err(BenchError::InvalidConfig)?;
                    if !modes.contains(&mode) {
                        modes.push(mode);
                    }
                }
                modes
            }
        };

        let warmup = validate_bounds("warmup", raw.warmup, defaults.driver.warmup)?;
        let measure = validate_bounds("measure", raw.measure, defaults.driver.measure)?;

        let isolation = match raw.isolation {
            None => defaults.isolation,
            Some(name) => name.parse().map_err(BenchError::InvalidConfig)?,
        };

        Ok(Self {
            datasets,
            adapters,
            modes,
            driver: DriverConfig {
                warmup,
                measure,
                target_budget_ms: raw
                    .target_budget_ms
                    .unwrap_or(defaults.driver.target_budget_ms),
            },
            isolation,
            log_path: raw.log_path.map(PathBuf::from),
        })
    }
}

fn validate_bounds(
    phase: &'static str,
    raw: Option<RawPhaseBounds>,
    default: PhaseBounds,
) -> BenchResult<PhaseBounds> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    let bounds = PhaseBounds {
        iterations: raw.iterations,
        max_duration_ms: raw.duration_ms,
    };
    // Zero iterations is a valid (degenerate) bound; no bounds at all has
    // no stopping rule and is rejected.
    if !bounds.is_bounded() {
        return Err(ConfigValidationError::UnboundedPhase { phase }.into());
    }
    Ok(bounds)
}

fn reject_duplicates(field: &'static str, names: &[String]) -> BenchResult<()> {
    let mut seen = std::collections::HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(ConfigValidationError::InvalidFieldValue {
                field,
                value: name.clone(),
                reason: "duplicate entry".to_string(),
            }
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mapping_gives_defaults() {
        let config = RunConfig::load_str("{}").unwrap();
        let builtins: Vec<String> = BUILTIN_FIXTURES.iter().map(|s| s.to_string()).collect();
        assert_eq!(config.datasets, builtins);
        assert_eq!(config.adapters.len(), 3);
        assert_eq!(config.modes, Mode::ALL.to_vec());
        assert_eq!(config.isolation, IsolationMode::Process);
    }

    #[test]
    fn test_full_config_parses() {
        let yaml = r#"
datasets: [user, repos]
adapters: [serde-json]
modes: [typed]
warmup:
  iterations: 5
measure:
  iterations: 50
  duration_ms: 1000
isolation: in-process
target_budget_ms: 5000
log_path: out/run.json
"#;
        let config = RunConfig::load_str(yaml).unwrap();
        assert_eq!(config.datasets, vec!["user", "repos"]);
        assert_eq!(config.adapters.len(), 1);
        assert_eq!(config.modes, vec![Mode::Typed]);
        assert_eq!(config.driver.warmup.iterations, Some(5));
        assert_eq!(config.driver.warmup.max_duration_ms, None);
        assert_eq!(config.driver.measure.max_duration_ms, Some(1000));
        assert_eq!(config.isolation, IsolationMode::InProcess);
        assert_eq!(config.driver.target_budget_ms, 5000);
        assert_eq!(config.log_path, Some(PathBuf::from("out/run.json")));
    }

    #[test]
    fn test_empty_datasets_rejected() {
        let err = RunConfig::load_str("datasets: []").unwrap_err();
        assert!(matches!(
            err,
            BenchError::InvalidConfig(ConfigValidationError::EmptyDatasets)
        ));
    }

    #[test]
    fn test_unbounded_phase_rejected() {
        let err = RunConfig::load_str("measure: {}").unwrap_err();
        assert!(matches!(
            err,
            BenchError::InvalidConfig(ConfigValidationError::UnboundedPhase { phase: "measure" })
        ));
    }

    #[test]
    fn test_zero_measure_iterations_allowed() {
        let config = RunConfig::load_str("measure:\n  iterations: 0\n").unwrap();
        assert_eq!(config.driver.measure.iterations, Some(0));
    }

    #[test]
    fn test_duplicate_dataset_rejected() {
        let err = RunConfig::load_str("datasets: [user, user]").unwrap_err();
        assert!(matches!(err, BenchError::InvalidConfig(_)));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let err = RunConfig::load_str("modes: [binary]").unwrap_err();
        assert!(matches!(
            err,
            BenchError::InvalidConfig(ConfigValidationError::UnknownMode { .. })
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = RunConfig::load_str("warm_up: {iterations: 3}").unwrap_err();
        assert!(matches!(err, BenchError::ConfigParse { .. }));
    }

    #[test]
    fn test_missing_file_is_config_not_found() {
        let err = RunConfig::load_file("/nonexistent/serbench.yaml").unwrap_err();
        assert!(matches!(err, BenchError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("serbench.yaml");
        std::fs::write(&path, "datasets: [user]\n").unwrap();
        let config = RunConfig::load_file(&path).unwrap();
        assert_eq!(config.datasets, vec!["user"]);
    }
}
