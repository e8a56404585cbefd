// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Serbench Contributors

//! Dataset registry: named fixtures and their parsed representations.
//!
//! A fixture is immutable raw JSON text (top-level array of objects). The
//! registry parses a fixture into both a strongly-typed and a generic
//! representation, independently, from the same raw text. Callers re-load
//! per measurement iteration so no iteration can observe another
//! iteration's parsed objects.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;

use crate::domain::{DomainShape, TypedRecords};
use crate::error::{BenchError, BenchResult};

const FIXTURE_CITYS: &str = include_str!("../fixtures/citys.json");
const FIXTURE_REPOS: &str = include_str!("../fixtures/repos.json");
const FIXTURE_USER: &str = include_str!("../fixtures/user.json");
const FIXTURE_REQUEST: &str = include_str!("../fixtures/request.json");

/// Built-in fixture names, largest corpus first.
pub const BUILTIN_FIXTURES: [&str; 4] = ["citys", "repos", "request", "user"];

/// Where a fixture's raw text comes from.
#[derive(Debug, Clone)]
enum FixtureSource {
    /// Compiled into the binary.
    Builtin(&'static str),
    /// Read from disk on every load.
    File(PathBuf),
    /// Registered directly (tests, ad-hoc corpora).
    Inline(String),
}

/// One dataset: fixture name plus both parsed representations.
///
/// Created fresh per iteration and discarded at iteration end.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub typed: TypedRecords,
    pub generic: Value,
}

/// Registry mapping fixture names to raw text and domain shapes.
#[derive(Debug, Default)]
pub struct FixtureRegistry {
    sources: BTreeMap<String, (FixtureSource, DomainShape)>,
}

impl FixtureRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the built-in corpora.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert("citys", FixtureSource::Builtin(FIXTURE_CITYS), DomainShape::Cities);
        registry.insert("repos", FixtureSource::Builtin(FIXTURE_REPOS), DomainShape::Repos);
        registry.insert("user", FixtureSource::Builtin(FIXTURE_USER), DomainShape::Users);
        registry.insert(
            "request",
            FixtureSource::Builtin(FIXTURE_REQUEST),
            DomainShape::Requests,
        );
        registry
    }

    fn insert(&mut self, name: &str, source: FixtureSource, shape: DomainShape) {
        self.sources.insert(name.to_string(), (source, shape));
    }

    /// Register a fixture backed by a file on disk.
    pub fn register_file(&mut self, name: impl Into<String>, shape: DomainShape, path: PathBuf) {
        self.sources.insert(name.into(), (FixtureSource::File(path), shape));
    }

    /// Register a fixture from an in-memory string.
    pub fn register_inline(&mut self, name: impl Into<String>, shape: DomainShape, text: String) {
        self.sources
            .insert(name.into(), (FixtureSource::Inline(text), shape));
    }

    /// Registered fixture names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    /// Check whether a fixture name is known.
    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    /// Get a fixture's raw text. Loading the same name twice yields
    /// byte-identical text for builtin and inline sources.
    pub fn raw(&self, name: &str) -> BenchResult<String> {
        let (source, _) = self.sources.get(name).ok_or_else(|| BenchError::ResourceNotFound {
            name: name.to_string(),
        })?;

        match source {
            FixtureSource::Builtin(text) => Ok((*text).to_string()),
            FixtureSource::Inline(text) => Ok(text.clone()),
            FixtureSource::File(path) => {
                std::fs::read_to_string(path).map_err(|e| BenchError::Io {
                    context: "reading fixture file",
                    source: e,
                })
            }
        }
    }

    /// Load a dataset: parse the typed and generic representations,
    /// independently, from the same raw text.
    pub fn load(&self, name: &str) -> BenchResult<Dataset> {
        let (_, shape) = self.sources.get(name).ok_or_else(|| BenchError::ResourceNotFound {
            name: name.to_string(),
        })?;
        let shape = *shape;
        let raw = self.raw(name)?;

        let typed = TypedRecords::parse(shape, &raw).map_err(|e| BenchError::FixtureParse {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        let generic: Value = serde_json::from_str(&raw).map_err(|e| BenchError::FixtureParse {
            name: name.to_string(),
            message: e.to_string(),
        })?;

        if !generic.is_array() {
            return Err(BenchError::FixtureParse {
                name: name.to_string(),
                message: "fixture is not a top-level JSON array".to_string(),
            });
        }

        Ok(Dataset {
            name: name.to_string(),
            typed,
            generic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_unknown_fixture_is_resource_not_found() {
        let registry = FixtureRegistry::with_builtins();
        let err = registry.load("invoices").unwrap_err();
        assert!(matches!(err, BenchError::ResourceNotFound { .. }));
    }

    #[test]
    fn test_raw_is_idempotent() {
        let registry = FixtureRegistry::with_builtins();
        for name in BUILTIN_FIXTURES {
            let first = registry.raw(name).unwrap();
            let second = registry.raw(name).unwrap();
            assert_eq!(first, second, "fixture '{}' raw text not stable", name);
        }
    }

    #[test]
    fn test_builtins_load_and_representations_agree() {
        let registry = FixtureRegistry::with_builtins();
        for name in BUILTIN_FIXTURES {
            let dataset = registry.load(name).unwrap();
            let generic_len = dataset.generic.as_array().unwrap().len();
            assert_eq!(
                dataset.typed.len(),
                generic_len,
                "typed/generic record counts differ for '{}'",
                name
            );
            assert!(!dataset.typed.is_empty());
        }
    }

    #[test]
    fn test_fresh_parse_per_load() {
        let registry = FixtureRegistry::with_builtins();
        let a = registry.load("user").unwrap();
        let b = registry.load("user").unwrap();
        // Same logical records, distinct object graphs.
        assert_eq!(a.generic, b.generic);
        assert_eq!(a.typed, b.typed);
    }

    #[test]
    fn test_malformed_fixture_is_parse_error() {
        let mut registry = FixtureRegistry::new();
        registry.register_inline("broken", DomainShape::Users, "[{\"id\":".to_string());
        let err = registry.load("broken").unwrap_err();
        assert!(matches!(err, BenchError::FixtureParse { .. }));
    }

    #[test]
    fn test_non_array_fixture_rejected() {
        let mut registry = FixtureRegistry::new();
        registry.register_inline("scalar", DomainShape::Users, "[]".to_string());
        // Empty array is fine...
        assert!(registry.load("scalar").is_ok());
        // ...but a top-level object is not.
        registry.register_inline("object", DomainShape::Users, "{}".to_string());
        assert!(registry.load("object").is_err());
    }

    #[test]
    fn test_file_backed_fixture() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let registry_text = FixtureRegistry::with_builtins().raw("user").unwrap();
        file.write_all(registry_text.as_bytes()).unwrap();

        let mut registry = FixtureRegistry::new();
        registry.register_file("user-copy", DomainShape::Users, file.path().to_path_buf());
        let dataset = registry.load("user-copy").unwrap();
        assert_eq!(dataset.typed.len(), 2);
    }
}
