//! The master identity record and its patch type.
//!
//! [`MasterIdentityRecord`] is the canonical copy of the organization's
//! public identity. Callers never mutate it in place: they submit a
//! [`MasterIdentityPatch`], which is validated and merged into a fresh record
//! by [`MasterIdentityRecord::apply_patch`].

use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// Structured postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
}

/// One independently compared part of an [`Address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressComponent {
    Street,
    City,
    Region,
    PostalCode,
    Country,
}

impl AddressComponent {
    /// All components in comparison order.
    pub const ALL: [AddressComponent; 5] = [
        Self::Street,
        Self::City,
        Self::Region,
        Self::PostalCode,
        Self::Country,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Street => "street",
            Self::City => "city",
            Self::Region => "region",
            Self::PostalCode => "postal_code",
            Self::Country => "country",
        }
    }
}

impl std::fmt::Display for AddressComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Address {
    /// Borrow the value of a single component.
    pub fn component(&self, component: AddressComponent) -> &str {
        match component {
            AddressComponent::Street => &self.street,
            AddressComponent::City => &self.city,
            AddressComponent::Region => &self.region,
            AddressComponent::PostalCode => &self.postal_code,
            AddressComponent::Country => &self.country,
        }
    }
}

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

// ---------------------------------------------------------------------------
// Master record
// ---------------------------------------------------------------------------

/// The single authoritative copy of the organization's identity data.
///
/// Field rules match [`MasterIdentityPatch`], so a record loaded at startup
/// is held to the same standard as one produced by an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MasterIdentityRecord {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub address: Address,
    #[validate(length(min = 1, message = "phone must not be empty"))]
    pub phone: String,
    #[serde(default)]
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    #[validate(url(message = "website must be a valid URL"))]
    pub website: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default = "chrono::Utc::now")]
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Patch DTOs
// ---------------------------------------------------------------------------

/// Field-wise partial update of an [`Address`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressPatch {
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Partial update of the master record. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MasterIdentityPatch {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub address: Option<AddressPatch>,
    #[validate(length(min = 1, message = "phone must not be empty"))]
    pub phone: Option<String>,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    #[validate(url(message = "website must be a valid URL"))]
    pub website: Option<String>,
    pub coordinates: Option<Coordinates>,
}

impl MasterIdentityRecord {
    /// Check field rules and coordinate ranges of a whole record.
    pub fn ensure_valid(&self) -> Result<(), CoreError> {
        self.validate()?;
        if let Some(coords) = &self.coordinates {
            validate_coordinates(coords)?;
        }
        Ok(())
    }

    /// Validate `patch` and return a new record with the supplied fields
    /// merged over `self`.
    pub fn apply_patch(&self, patch: MasterIdentityPatch) -> Result<Self, CoreError> {
        patch.validate()?;
        if let Some(coords) = &patch.coordinates {
            validate_coordinates(coords)?;
        }

        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = name;
        }
        if let Some(address) = patch.address {
            merge_address(&mut next.address, address);
        }
        if let Some(phone) = patch.phone {
            next.phone = phone;
        }
        if let Some(email) = patch.email {
            next.email = Some(email);
        }
        if let Some(website) = patch.website {
            next.website = website;
        }
        if let Some(coordinates) = patch.coordinates {
            next.coordinates = Some(coordinates);
        }
        next.updated_at = Utc::now();
        Ok(next)
    }
}

fn merge_address(address: &mut Address, patch: AddressPatch) {
    if let Some(v) = patch.street {
        address.street = v;
    }
    if let Some(v) = patch.city {
        address.city = v;
    }
    if let Some(v) = patch.region {
        address.region = v;
    }
    if let Some(v) = patch.postal_code {
        address.postal_code = v;
    }
    if let Some(v) = patch.country {
        address.country = v;
    }
}

/// Validate that coordinates fall within the WGS84 ranges.
pub fn validate_coordinates(coords: &Coordinates) -> Result<(), CoreError> {
    if !(-90.0..=90.0).contains(&coords.latitude) {
        return Err(CoreError::Validation(format!(
            "latitude must be between -90 and 90, got {}",
            coords.latitude
        )));
    }
    if !(-180.0..=180.0).contains(&coords.longitude) {
        return Err(CoreError::Validation(format!(
            "longitude must be between -180 and 180, got {}",
            coords.longitude
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
