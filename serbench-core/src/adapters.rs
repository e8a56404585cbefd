// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Serbench Contributors

//! Built-in engine adapters: serde_json, simd-json, and sonic-rs.
//!
//! Each adapter wraps exactly one engine's public serialize entry point.
//! All three go through the shared serde data model, so the fixed date
//! format from the adapter configuration applies uniformly.

use serde_json::Value;

use crate::adapter::{AdapterConfig, Capabilities, SerializerAdapter};
use crate::domain::TypedRecords;
use crate::error::{BenchError, BenchResult};
use crate::types::AdapterId;

fn engine_failure(id: &AdapterId, err: impl std::fmt::Display) -> BenchError {
    BenchError::AdapterFailure {
        adapter: id.to_string(),
        message: err.to_string(),
    }
}

/// Adapter over `serde_json`, the baseline engine.
pub struct SerdeJsonAdapter {
    id: AdapterId,
    config: AdapterConfig,
}

impl SerdeJsonAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            id: AdapterId::new("serde-json").expect("static id is valid"),
            config,
        }
    }
}

impl SerializerAdapter for SerdeJsonAdapter {
    fn id(&self) -> &AdapterId {
        &self.id
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::BOTH
    }

    fn config(&self) -> &AdapterConfig {
        &self.config
    }

    fn serialize_typed(&self, records: &TypedRecords) -> BenchResult<String> {
        serde_json::to_string(records).map_err(|e| engine_failure(&self.id, e))
    }

    fn serialize_generic(&self, value: &Value) -> BenchResult<String> {
        serde_json::to_string(value).map_err(|e| engine_failure(&self.id, e))
    }
}

/// Adapter over `simd-json`'s serde-compatible serializer.
pub struct SimdJsonAdapter {
    id: AdapterId,
    config: AdapterConfig,
}

impl SimdJsonAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            id: AdapterId::new("simd-json").expect("static id is valid"),
            config,
        }
    }
}

impl SerializerAdapter for SimdJsonAdapter {
    fn id(&self) -> &AdapterId {
        &self.id
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::BOTH
    }

    fn config(&self) -> &AdapterConfig {
        &self.config
    }

    fn serialize_typed(&self, records: &TypedRecords) -> BenchResult<String> {
        simd_json::to_string(records).map_err(|e| engine_failure(&self.id, e))
    }

    fn serialize_generic(&self, value: &Value) -> BenchResult<String> {
        simd_json::to_string(value).map_err(|e| engine_failure(&self.id, e))
    }
}

/// Adapter over `sonic-rs`.
pub struct SonicRsAdapter {
    id: AdapterId,
    config: AdapterConfig,
}

impl SonicRsAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            id: AdapterId::new("sonic-rs").expect("static id is valid"),
            config,
        }
    }
}

impl SerializerAdapter for SonicRsAdapter {
    fn id(&self) -> &AdapterId {
        &self.id
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::BOTH
    }

    fn config(&self) -> &AdapterConfig {
        &self.config
    }

    fn serialize_typed(&self, records: &TypedRecords) -> BenchResult<String> {
        sonic_rs::to_string(records).map_err(|e| engine_failure(&self.id, e))
    }

    fn serialize_generic(&self, value: &Value) -> BenchResult<String> {
        sonic_rs::to_string(value).map_err(|e| engine_failure(&self.id, e))
    }
}

/// Construct every built-in engine adapter, all bound to the same
/// configuration.
pub fn builtin_engines(config: AdapterConfig) -> Vec<Box<dyn SerializerAdapter>> {
    vec![
        Box::new(SerdeJsonAdapter::new(config)),
        Box::new(SimdJsonAdapter::new(config)),
        Box::new(SonicRsAdapter::new(config)),
    ]
}
