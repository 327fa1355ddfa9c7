//! Platform targets, raw provider snapshots, and per-platform audit results.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::discrepancy::Discrepancy;
use crate::identity::Address;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// An external platform the engine is configured to audit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformTarget {
    /// Unique label, e.g. `"google_business"`.
    pub name: String,
    /// Access descriptor understood by the provider (usually a URL).
    pub endpoint: String,
}

impl PlatformTarget {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw snapshot
// ---------------------------------------------------------------------------

/// Identity data as currently published by one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSnapshot {
    pub name: String,
    pub address: Address,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub last_updated: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Fetch failure
// ---------------------------------------------------------------------------

/// Why a provider could not return a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    Timeout,
    Network,
    NotFound,
    ParseError,
}

impl FailureReason {
    /// Timeouts and network errors may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Network)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::NotFound => "not_found",
            Self::ParseError => "parse_error",
        }
    }
}

/// Typed fetch failure. Providers return this instead of panicking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub reason: FailureReason,
    pub message: String,
}

impl FetchFailure {
    pub fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.reason.as_str(), self.message)
    }
}

// ---------------------------------------------------------------------------
// Audit result
// ---------------------------------------------------------------------------

/// Coarse per-platform classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    Consistent,
    Inconsistent,
    /// The platform has no listing for the organization.
    Missing,
    /// The fetch failed for a transport or parse reason.
    Error,
}

/// One platform's audit result for one audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSnapshot {
    pub platform: String,
    pub name: Option<String>,
    pub address: Option<Address>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub verified: bool,
    pub last_updated: Option<Timestamp>,
    pub status: SnapshotStatus,
    pub discrepancies: Vec<Discrepancy>,
    pub score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FetchFailure>,
    pub checked_at: Timestamp,
}

impl PlatformSnapshot {
    /// Build the result for a successfully fetched and analyzed platform.
    pub fn analyzed(
        platform: impl Into<String>,
        raw: RawSnapshot,
        discrepancies: Vec<Discrepancy>,
        status: SnapshotStatus,
        score: u8,
    ) -> Self {
        Self {
            platform: platform.into(),
            name: Some(raw.name),
            address: Some(raw.address),
            phone: Some(raw.phone),
            email: raw.email,
            website: raw.website,
            verified: raw.verified,
            last_updated: raw.last_updated,
            status,
            discrepancies,
            score,
            failure: None,
            checked_at: Utc::now(),
        }
    }

    /// Build the result for a platform whose fetch failed.
    ///
    /// `not_found` becomes [`SnapshotStatus::Missing`]; every other reason
    /// becomes [`SnapshotStatus::Error`]. Both score zero.
    pub fn failed(platform: impl Into<String>, failure: FetchFailure) -> Self {
        let status = match failure.reason {
            FailureReason::NotFound => SnapshotStatus::Missing,
            _ => SnapshotStatus::Error,
        };
        Self {
            platform: platform.into(),
            name: None,
            address: None,
            phone: None,
            email: None,
            website: None,
            verified: false,
            last_updated: None,
            status,
            discrepancies: Vec::new(),
            score: 0,
            failure: Some(failure),
            checked_at: Utc::now(),
        }
    }

    /// True for `missing` and `error` results.
    pub fn is_failed(&self) -> bool {
        matches!(self.status, SnapshotStatus::Missing | SnapshotStatus::Error)
    }
}
