//! Field-level discrepancy types emitted by the analyzer.

use serde::{Deserialize, Serialize};

use crate::identity::AddressComponent;

/// Identity field a discrepancy refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Phone,
    Email,
    Address,
    Website,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Self::Name,
        Self::Phone,
        Self::Email,
        Self::Address,
        Self::Website,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Address => "address",
            Self::Website => "website",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How badly a mismatch hurts. Ordered so that `Critical > Major > Minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minor,
    Major,
    Critical,
}

impl Severity {
    /// Points subtracted from a platform's score per discrepancy.
    pub fn penalty(&self) -> u8 {
        match self {
            Self::Critical => 25,
            Self::Major => 15,
            Self::Minor => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Major => "major",
            Self::Minor => "minor",
        }
    }
}

/// Which search-visibility area a mismatch affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactCategory {
    LocalPack,
    Organic,
    Citations,
    Brand,
}

/// A single mismatch between one platform snapshot and the master record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub field: Field,
    /// Set only for [`Field::Address`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<AddressComponent>,
    pub current_value: String,
    pub expected_value: String,
    pub severity: Severity,
    pub impact: ImpactCategory,
    pub fixable: bool,
    pub platform: String,
}

impl Discrepancy {
    /// Human-readable label, e.g. `address.city` or `phone`.
    pub fn label(&self) -> String {
        match self.component {
            Some(component) => format!("{}.{}", self.field, component),
            None => self.field.to_string(),
        }
    }
}
