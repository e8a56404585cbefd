// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Serbench Contributors

//! Uniform capability contract over candidate serialization engines.
//!
//! Every engine is consumed only through [`SerializerAdapter`]; the harness
//! never depends on engine-internal types. An adapter declares which modes
//! it supports, and targets in unsupported modes are reported as not
//! applicable rather than attempted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::domain::{TypedRecords, DATE_FORMAT};
use crate::error::{BenchError, BenchResult};
use crate::types::{AdapterId, Mode};

/// Which serialization modes an adapter supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub typed: bool,
    pub generic: bool,
}

impl Capabilities {
    pub const BOTH: Capabilities = Capabilities {
        typed: true,
        generic: true,
    };

    pub fn supports(&self, mode: Mode) -> bool {
        match mode {
            Mode::Typed => self.typed,
            Mode::Generic => self.generic,
        }
    }
}

/// Textual date formats an adapter can be bound to.
///
/// Only one format exists today; the point of carrying it explicitly is
/// that every adapter states its binding, and the registry can verify the
/// bindings agree before any timing starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateFormat {
    #[default]
    Iso8601Utc,
}

impl DateFormat {
    pub const fn pattern(&self) -> &'static str {
        match self {
            Self::Iso8601Utc => DATE_FORMAT,
        }
    }
}

/// Immutable configuration bound to an adapter at construction time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    pub date_format: DateFormat,
}

/// One candidate engine behind the shared two-method contract.
///
/// Adapters are constructed once at setup and live for the run. They must
/// not retain references to input data across calls; any engine-internal
/// caches are the engine's business, not harness state.
pub trait SerializerAdapter {
    /// Stable identifier used in target keys and reports.
    fn id(&self) -> &AdapterId;

    /// Modes this adapter supports.
    fn capabilities(&self) -> Capabilities;

    /// Configuration bound at construction.
    fn config(&self) -> &AdapterConfig;

    /// Serialize the strongly-typed representation.
    fn serialize_typed(&self, records: &TypedRecords) -> BenchResult<String> {
        let _ = records;
        Err(BenchError::AdapterFailure {
            adapter: self.id().to_string(),
            message: "typed mode not supported".to_string(),
        })
    }

    /// Serialize the generic map/list representation.
    fn serialize_generic(&self, value: &Value) -> BenchResult<String> {
        let _ = value;
        Err(BenchError::AdapterFailure {
            adapter: self.id().to_string(),
            message: "generic mode not supported".to_string(),
        })
    }
}

/// Registry mapping adapter identifiers to implementations.
///
/// Selection happens by identifier, not by type hierarchy; new engines plug
/// in without touching the driver.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<AdapterId, Box<dyn SerializerAdapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in engine, all bound to the same
    /// configuration.
    pub fn with_builtin_engines(config: AdapterConfig) -> Self {
        let mut registry = Self::new();
        for adapter in crate::adapters::builtin_engines(config) {
            // Built-in ids are valid by construction.
            registry
                .register(adapter)
                .expect("built-in adapter ids are unique");
        }
        registry
    }

    /// Register an adapter. Duplicate identifiers are rejected.
    pub fn register(&mut self, adapter: Box<dyn SerializerAdapter>) -> BenchResult<()> {
        let id = adapter.id().clone();
        if self.adapters.contains_key(&id) {
            return Err(BenchError::AdapterAlreadyRegistered { id: id.to_string() });
        }
        self.adapters.insert(id, adapter);
        Ok(())
    }

    /// Look up an adapter by identifier.
    pub fn get(&self, id: &AdapterId) -> Option<&dyn SerializerAdapter> {
        self.adapters.get(id).map(|boxed| boxed.as_ref())
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<AdapterId> {
        self.adapters.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Verify all adapters share one date-format binding.
    ///
    /// A mismatch would make output sizes incomparable across engines, so
    /// it is surfaced as a configuration warning. Non-fatal; the run
    /// continues.
    pub fn check_date_formats(&self) -> bool {
        let mut formats = self.adapters.values().map(|a| a.config().date_format);
        let Some(first) = formats.next() else {
            return true;
        };
        let consistent = formats.all(|f| f == first);
        if !consistent {
            warn!("inconsistent date-format configuration across adapters; output sizes are not comparable");
        }
        consistent
    }
}
