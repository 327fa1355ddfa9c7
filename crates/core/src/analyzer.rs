//! Consistency analyzer: field-by-field comparison of a platform snapshot
//! against the master identity record.
//!
//! Rules per field:
//!
//! | Field    | Severity                                             | Impact       |
//! |----------|------------------------------------------------------|--------------|
//! | name     | critical without brand token, major without a category token, else minor | `brand` |
//! | phone    | critical                                             | `local_pack` |
//! | address  | per component, see [`ComparisonPolicy::address_severity`] | `local_pack` |
//! | email    | minor (only when the platform lists one)             | `citations`  |
//! | website  | minor (only when the platform lists one)             | `organic`    |
//!
//! Discrepancies are never merged or deduplicated across fields.

use crate::discrepancy::{Discrepancy, Field, ImpactCategory, Severity};
use crate::identity::{AddressComponent, MasterIdentityRecord};
use crate::normalize::{
    contains_token, normalize_email, normalize_phone, normalize_text, normalize_website,
};
use crate::platform::RawSnapshot;
use crate::policy::ComparisonPolicy;

/// Compare every field of `raw` against `master`.
pub fn compare(
    platform: &str,
    raw: &RawSnapshot,
    master: &MasterIdentityRecord,
    policy: &ComparisonPolicy,
) -> Vec<Discrepancy> {
    compare_fields(platform, raw, master, policy, &Field::ALL)
}

/// Compare only the listed fields. Output follows [`Field::ALL`] order.
pub fn compare_fields(
    platform: &str,
    raw: &RawSnapshot,
    master: &MasterIdentityRecord,
    policy: &ComparisonPolicy,
    fields: &[Field],
) -> Vec<Discrepancy> {
    let mut out = Vec::new();
    for field in Field::ALL {
        if !fields.contains(&field) {
            continue;
        }
        match field {
            Field::Name => compare_name(platform, raw, master, policy, &mut out),
            Field::Phone => compare_phone(platform, raw, master, policy, &mut out),
            Field::Address => compare_address(platform, raw, master, policy, &mut out),
            Field::Email => compare_email(platform, raw, master, &mut out),
            Field::Website => compare_website(platform, raw, master, &mut out),
        }
    }
    out
}

fn discrepancy(
    platform: &str,
    field: Field,
    current: &str,
    expected: &str,
    severity: Severity,
    impact: ImpactCategory,
) -> Discrepancy {
    Discrepancy {
        field,
        component: None,
        current_value: current.to_string(),
        expected_value: expected.to_string(),
        severity,
        impact,
        fixable: true,
        platform: platform.to_string(),
    }
}

fn compare_name(
    platform: &str,
    raw: &RawSnapshot,
    master: &MasterIdentityRecord,
    policy: &ComparisonPolicy,
    out: &mut Vec<Discrepancy>,
) {
    if raw.name.trim() == master.name.trim() {
        return;
    }
    out.push(discrepancy(
        platform,
        Field::Name,
        &raw.name,
        &master.name,
        name_severity(&raw.name, &master.name, policy),
        ImpactCategory::Brand,
    ));
}

/// Classify a name mismatch by which tokens the platform name omits.
pub fn name_severity(platform_name: &str, master_name: &str, policy: &ComparisonPolicy) -> Severity {
    let brand_missing = policy
        .resolve_brand_token(master_name)
        .is_some_and(|brand| !contains_token(platform_name, &brand));
    if brand_missing {
        return Severity::Critical;
    }

    let category_missing = policy
        .resolve_category_tokens(master_name)
        .iter()
        .any(|token| !contains_token(platform_name, token));
    if category_missing {
        Severity::Major
    } else {
        Severity::Minor
    }
}

fn compare_phone(
    platform: &str,
    raw: &RawSnapshot,
    master: &MasterIdentityRecord,
    policy: &ComparisonPolicy,
    out: &mut Vec<Discrepancy>,
) {
    let equal = if policy.normalize_phone {
        normalize_phone(&raw.phone, &policy.default_country_code)
            == normalize_phone(&master.phone, &policy.default_country_code)
    } else {
        raw.phone == master.phone
    };
    if !equal {
        out.push(discrepancy(
            platform,
            Field::Phone,
            &raw.phone,
            &master.phone,
            Severity::Critical,
            ImpactCategory::LocalPack,
        ));
    }
}

fn compare_address(
    platform: &str,
    raw: &RawSnapshot,
    master: &MasterIdentityRecord,
    policy: &ComparisonPolicy,
    out: &mut Vec<Discrepancy>,
) {
    for component in AddressComponent::ALL {
        let current = raw.address.component(component);
        let expected = master.address.component(component);
        let equal = if policy.normalize_address {
            normalize_text(current) == normalize_text(expected)
        } else {
            current == expected
        };
        if equal {
            continue;
        }
        let mut d = discrepancy(
            platform,
            Field::Address,
            current,
            expected,
            policy.address_severity(component),
            ImpactCategory::LocalPack,
        );
        d.component = Some(component);
        out.push(d);
    }
}

fn compare_email(
    platform: &str,
    raw: &RawSnapshot,
    master: &MasterIdentityRecord,
    out: &mut Vec<Discrepancy>,
) {
    // Nothing to check unless both sides carry an email.
    let (Some(current), Some(expected)) = (&raw.email, &master.email) else {
        return;
    };
    if normalize_email(current) != normalize_email(expected) {
        out.push(discrepancy(
            platform,
            Field::Email,
            current,
            expected,
            Severity::Minor,
            ImpactCategory::Citations,
        ));
    }
}

fn compare_website(
    platform: &str,
    raw: &RawSnapshot,
    master: &MasterIdentityRecord,
    out: &mut Vec<Discrepancy>,
) {
    let Some(current) = &raw.website else {
        return;
    };
    if master.website.trim().is_empty() {
        return;
    }
    if normalize_website(current) != normalize_website(&master.website) {
        out.push(discrepancy(
            platform,
            Field::Website,
            current,
            &master.website,
            Severity::Minor,
            ImpactCategory::Organic,
        ));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
