//! Configurable comparison policy for the consistency analyzer.
//!
//! Normalization and the address severity mapping are policy, not
//! constants: deployments can turn normalization off (raw string
//! comparison) or promote other address components to `major`.

use serde::{Deserialize, Serialize};

use crate::discrepancy::Severity;
use crate::error::CoreError;
use crate::identity::AddressComponent;
use crate::normalize::tokenize;

/// Default country calling code used to expand national trunk prefixes.
pub const DEFAULT_COUNTRY_CODE: &str = "49";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonPolicy {
    /// Compare phone numbers in normalized international digit form.
    pub normalize_phone: bool,
    /// Calling code substituted for a leading trunk `0`.
    pub default_country_code: String,
    /// Fold case and whitespace in address components before comparing.
    pub normalize_address: bool,
    /// Address components whose mismatch is `major`; all others are `minor`.
    pub major_address_components: Vec<AddressComponent>,
    /// Core brand word(s). Defaults to the first word of the master name.
    pub brand_token: Option<String>,
    /// Category words. Defaults to the remaining words of the master name.
    pub category_tokens: Option<Vec<String>>,
}

impl Default for ComparisonPolicy {
    fn default() -> Self {
        Self {
            normalize_phone: true,
            default_country_code: DEFAULT_COUNTRY_CODE.to_string(),
            normalize_address: true,
            major_address_components: vec![AddressComponent::City, AddressComponent::PostalCode],
            brand_token: None,
            category_tokens: None,
        }
    }
}

impl ComparisonPolicy {
    /// Severity of a mismatch on the given address component.
    pub fn address_severity(&self, component: AddressComponent) -> Severity {
        if self.major_address_components.contains(&component) {
            Severity::Major
        } else {
            Severity::Minor
        }
    }

    /// The brand token to look for, derived from `master_name` if unset.
    pub fn resolve_brand_token(&self, master_name: &str) -> Option<String> {
        match &self.brand_token {
            Some(token) => Some(token.clone()),
            None => tokenize(master_name).into_iter().next(),
        }
    }

    /// The category tokens to look for, derived from `master_name` if unset.
    pub fn resolve_category_tokens(&self, master_name: &str) -> Vec<String> {
        match &self.category_tokens {
            Some(tokens) => tokens.clone(),
            None => {
                let brand = self.resolve_brand_token(master_name).unwrap_or_default();
                let brand_words = tokenize(&brand);
                tokenize(master_name)
                    .into_iter()
                    .filter(|w| !brand_words.contains(w))
                    .collect()
            }
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let cc = &self.default_country_code;
        if cc.is_empty() || cc.len() > 3 || !cc.chars().all(|c| c.is_ascii_digit()) {
            return Err(CoreError::Validation(format!(
                "default_country_code must be 1-3 digits, got '{cc}'"
            )));
        }
        if let Some(brand) = &self.brand_token {
            if tokenize(brand).is_empty() {
                return Err(CoreError::Validation(
                    "brand_token must contain at least one word".to_string(),
                ));
            }
        }
        if let Some(tokens) = &self.category_tokens {
            if tokens.iter().any(|t| tokenize(t).is_empty()) {
                return Err(CoreError::Validation(
                    "category_tokens must not contain empty entries".to_string(),
                ));
            }
        }
        Ok(())
    }
}
