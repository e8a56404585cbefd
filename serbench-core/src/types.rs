// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Serbench Contributors

//! Newtype wrappers and small enums shared across the harness.
//!
//! Identifiers validate their invariants at creation time so the rest of
//! the harness can assume they are well-formed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigValidationError;

/// Validated adapter identifier.
/// Must be non-empty, alphanumeric with hyphens/underscores, max 64 chars.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AdapterId(String);

impl AdapterId {
    /// Create a new AdapterId with validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ConfigValidationError> {
        let id = id.into();

        if id.is_empty() {
            return Err(ConfigValidationError::InvalidFieldValue {
                field: "adapter_id",
                value: id,
                reason: "Adapter ID cannot be empty".to_string(),
            });
        }

        if id.len() > 64 {
            return Err(ConfigValidationError::InvalidFieldValue {
                field: "adapter_id",
                value: id.clone(),
                reason: format!("Adapter ID too long: {} chars (max 64)", id.len()),
            });
        }

        if !id
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigValidationError::InvalidFieldValue {
                field: "adapter_id",
                value: id,
                reason: "Adapter ID must contain only alphanumeric characters, hyphens, and underscores"
                    .to_string(),
            });
        }

        Ok(Self(id))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for AdapterId {
    type Error = ConfigValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AdapterId> for String {
    fn from(id: AdapterId) -> Self {
        id.0
    }
}

/// Serialization mode of a benchmark target.
///
/// `Typed` serializes the strongly-typed record representation; `Generic`
/// serializes the generic map/list document model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Typed,
    Generic,
}

impl Mode {
    /// All modes, in report order.
    pub const ALL: [Mode; 2] = [Mode::Typed, Mode::Generic];

    /// Get the mode name for keys and error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Typed => "typed",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Mode {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "typed" | "pojo" => Ok(Self::Typed),
            "generic" | "maplist" => Ok(Self::Generic),
            other => Err(ConfigValidationError::UnknownMode {
                value: other.to_string(),
            }),
        }
    }
}

/// Execution context strategy for one benchmark target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IsolationMode {
    /// Each target runs in a freshly spawned child process.
    Process,
    /// Each target runs in a fresh driver invocation within this process.
    InProcess,
}

impl fmt::Display for IsolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Process => write!(f, "process"),
            Self::InProcess => write!(f, "in-process"),
        }
    }
}

impl FromStr for IsolationMode {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "process" => Ok(Self::Process),
            "in-process" | "inprocess" => Ok(Self::InProcess),
            other => Err(ConfigValidationError::UnknownIsolation {
                value: other.to_string(),
            }),
        }
    }
}

/// Unique key of one benchmark target: (dataset, adapter, mode).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetKey {
    pub dataset: String,
    pub adapter: AdapterId,
    pub mode: Mode,
}

impl TargetKey {
    pub fn new(dataset: impl Into<String>, adapter: AdapterId, mode: Mode) -> Self {
        Self {
            dataset: dataset.into(),
            adapter,
            mode,
        }
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.dataset, self.adapter, self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_id_valid() {
        let id = AdapterId::new("serde-json").unwrap();
        assert_eq!(id.as_str(), "serde-json");
    }

    #[test]
    fn test_adapter_id_empty_rejected() {
        assert!(AdapterId::new("").is_err());
    }

    #[test]
    fn test_adapter_id_bad_chars_rejected() {
        assert!(AdapterId::new("serde json").is_err());
        assert!(AdapterId::new("serde/json").is_err());
    }

    #[test]
    fn test_adapter_id_too_long_rejected() {
        assert!(AdapterId::new("a".repeat(65)).is_err());
    }

    #[test]
    fn test_mode_parse_aliases() {
        assert_eq!("typed".parse::<Mode>().unwrap(), Mode::Typed);
        assert_eq!("pojo".parse::<Mode>().unwrap(), Mode::Typed);
        assert_eq!("maplist".parse::<Mode>().unwrap(), Mode::Generic);
        assert!("binary".parse::<Mode>().is_err());
    }

    #[test]
    fn test_isolation_parse() {
        assert_eq!(
            "process".parse::<IsolationMode>().unwrap(),
            IsolationMode::Process
        );
        assert_eq!(
            "in-process".parse::<IsolationMode>().unwrap(),
            IsolationMode::InProcess
        );
        assert!("thread".parse::<IsolationMode>().is_err());
    }

    #[test]
    fn test_target_key_display() {
        let key = TargetKey::new("citys", AdapterId::new("sonic-rs").unwrap(), Mode::Generic);
        assert_eq!(key.to_string(), "citys/sonic-rs/generic");
    }
}
