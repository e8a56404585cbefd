// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Serbench Contributors

//! Strongly-typed record shapes for the built-in fixture corpora.
//!
//! These mirror the logical structure of the fixture files one-to-one so
//! that the typed and generic representations of a dataset always describe
//! the same records. All timestamp fields go through the shared [`iso8601`]
//! serde helper, which pins every adapter to one textual date format and
//! keeps output sizes comparable across engines.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigValidationError;

/// The single date format rendered by every adapter: ISO-8601, UTC,
/// second precision, `Z` suffix.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Serde helper pinning `DateTime<Utc>` fields to [`DATE_FORMAT`].
pub mod iso8601 {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::DATE_FORMAT;

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&text, DATE_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

/// One city record from the `citys` corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityInfo {
    pub city_id: u64,
    pub name: String,
    pub country: String,
    pub region: String,
    pub population: u64,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_m: i64,
    pub timezone: String,
    #[serde(with = "iso8601")]
    pub updated_at: DateTime<Utc>,
    pub landmarks: Vec<String>,
}

/// One repository record from the `repos` corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub owner: RepoOwner,
    pub private: bool,
    pub fork: bool,
    pub language: Option<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub open_issues_count: u64,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso8601")]
    pub pushed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoOwner {
    pub id: u64,
    pub login: String,
    pub site_admin: bool,
}

/// One user record from the `user` corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub active: bool,
    pub followers: u64,
    pub roles: Vec<String>,
    pub preferences: BTreeMap<String, String>,
    #[serde(with = "iso8601")]
    pub registered_at: DateTime<Utc>,
    #[serde(with = "iso8601")]
    pub last_login_at: DateTime<Utc>,
}

/// One HTTP request log record from the `request` corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub status: u16,
    pub client_ip: String,
    pub user_agent: String,
    pub latency_ms: f64,
    pub bytes_sent: u64,
    pub headers: Vec<Header>,
    #[serde(with = "iso8601")]
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Which record shape a fixture deserializes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainShape {
    Cities,
    Repos,
    Users,
    Requests,
}

impl DomainShape {
    /// Map a built-in fixture name to its record shape.
    pub fn for_fixture(name: &str) -> Result<Self, ConfigValidationError> {
        match name {
            "citys" => Ok(Self::Cities),
            "repos" => Ok(Self::Repos),
            "user" => Ok(Self::Users),
            "request" => Ok(Self::Requests),
            other => Err(ConfigValidationError::UnknownShape {
                name: other.to_string(),
            }),
        }
    }
}

/// The strongly-typed representation of a dataset: a homogeneous array of
/// domain records. Untagged so serialization emits the plain JSON array the
/// fixture holds, not an enum wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedRecords {
    Cities(Vec<CityInfo>),
    Repos(Vec<Repo>),
    Users(Vec<UserProfile>),
    Requests(Vec<Request>),
}

impl TypedRecords {
    /// Parse raw fixture text into the typed representation for a shape.
    pub fn parse(shape: DomainShape, raw: &str) -> Result<Self, serde_json::Error> {
        Ok(match shape {
            DomainShape::Cities => Self::Cities(serde_json::from_str(raw)?),
            DomainShape::Repos => Self::Repos(serde_json::from_str(raw)?),
            DomainShape::Users => Self::Users(serde_json::from_str(raw)?),
            DomainShape::Requests => Self::Requests(serde_json::from_str(raw)?),
        })
    }

    /// Number of records in the array.
    pub fn len(&self) -> usize {
        match self {
            Self::Cities(v) => v.len(),
            Self::Repos(v) => v.len(),
            Self::Users(v) => v.len(),
            Self::Requests(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iso8601_round_trip() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 2, 21, 42, 31).unwrap();
        let rendered = dt.format(DATE_FORMAT).to_string();
        assert_eq!(rendered, "2024-05-02T21:42:31Z");

        #[derive(Serialize, Deserialize)]
        struct Wrap {
            #[serde(with = "iso8601")]
            ts: DateTime<Utc>,
        }

        let json = serde_json::to_string(&Wrap { ts: dt }).unwrap();
        assert_eq!(json, r#"{"ts":"2024-05-02T21:42:31Z"}"#);
        let back: Wrap = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ts, dt);
    }

    #[test]
    fn test_typed_records_untagged_serialization() {
        let records = TypedRecords::Users(vec![]);
        assert_eq!(serde_json::to_string(&records).unwrap(), "[]");
    }

    #[test]
    fn test_shape_for_fixture() {
        assert_eq!(DomainShape::for_fixture("citys").unwrap(), DomainShape::Cities);
        assert_eq!(DomainShape::for_fixture("request").unwrap(), DomainShape::Requests);
        assert!(DomainShape::for_fixture("invoices").is_err());
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = TypedRecords::parse(DomainShape::Users, "{}");
        assert!(err.is_err());
    }
}
