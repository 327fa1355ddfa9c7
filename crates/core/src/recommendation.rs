//! Remediation recommendations derived from discrepancies.
//!
//! Every discrepancy in a report yields exactly one [`Recommendation`]. The
//! full set is stably sorted by descending [`Priority`] and truncated to
//! [`MAX_RECOMMENDATIONS`]. Recommendations are advisory only: nothing in
//! this engine executes a fix.

use serde::{Deserialize, Serialize};

use crate::discrepancy::{Discrepancy, Field, ImpactCategory, Severity};
use crate::identity::AddressComponent;
use crate::platform::PlatformSnapshot;

/// Upper bound on recommendations per report.
pub const MAX_RECOMMENDATIONS: usize = 10;

/// Ordered so that `Critical > High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Reserved for advisories that do not stem from a discrepancy.
    Low,
    Medium,
    High,
    Critical,
}

impl From<Severity> for Priority {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Critical => Self::Critical,
            Severity::Major => Self::High,
            Severity::Minor => Self::Medium,
        }
    }
}

/// Coarse low / medium / high scale for impact and effort estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Medium,
    High,
}

/// Expected benefit of fixing a discrepancy with the given impact category.
pub fn estimated_impact(category: ImpactCategory) -> Level {
    match category {
        ImpactCategory::LocalPack => Level::High,
        ImpactCategory::Organic | ImpactCategory::Citations => Level::Medium,
        ImpactCategory::Brand => Level::Low,
    }
}

/// Expected effort to correct the given field on a platform.
pub fn estimated_effort(field: Field) -> Level {
    match field {
        Field::Phone | Field::Email => Level::Low,
        Field::Name => Level::High,
        Field::Address | Field::Website => Level::Medium,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub action: String,
    pub platform: String,
    pub field: Field,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<AddressComponent>,
    pub expected_value: String,
    pub impact: Level,
    pub effort: Level,
    pub steps: Vec<String>,
    /// Fixable and auto-fix is enabled. Flag only; never executed.
    pub auto_fix_eligible: bool,
}

impl Recommendation {
    /// Build the recommendation for a single discrepancy.
    pub fn from_discrepancy(d: &Discrepancy, auto_fix_enabled: bool) -> Self {
        let label = d.label().replace('_', " ");
        Self {
            priority: d.severity.into(),
            action: format!(
                "Update {label} on {} from '{}' to '{}'",
                d.platform, d.current_value, d.expected_value
            ),
            platform: d.platform.clone(),
            field: d.field,
            component: d.component,
            expected_value: d.expected_value.clone(),
            impact: estimated_impact(d.impact),
            effort: estimated_effort(d.field),
            steps: fix_steps(d),
            auto_fix_eligible: auto_fix_enabled && d.fixable,
        }
    }
}

/// Ordered, human-readable steps for correcting a discrepancy.
fn fix_steps(d: &Discrepancy) -> Vec<String> {
    let platform = &d.platform;
    let expected = &d.expected_value;
    let mut steps = vec![format!("Sign in to the {platform} listing management console")];
    match d.field {
        Field::Name => {
            steps.push(format!("Open the business profile and change the name to '{expected}'"));
            steps.push("Submit supporting documents if the platform requests name verification".to_string());
        }
        Field::Phone => {
            steps.push(format!("Replace the primary phone number with '{expected}'"));
            steps.push("Remove outdated secondary numbers that route elsewhere".to_string());
        }
        Field::Address => {
            let part = d.component.map(|c| c.as_str().replace('_', " ")).unwrap_or_default();
            steps.push(format!("Edit the address {part} and set it to '{expected}'"));
            steps.push("Confirm the map pin still matches the corrected address".to_string());
        }
        Field::Email => {
            steps.push(format!("Set the contact email to '{expected}'"));
        }
        Field::Website => {
            steps.push(format!("Set the website URL to '{expected}'"));
            steps.push("Check that the link resolves without redirects".to_string());
        }
    }
    steps.push("Re-run the audit after the platform publishes the change".to_string());
    steps
}

/// Produce the ranked, capped recommendation list for a set of results.
pub fn generate(platforms: &[PlatformSnapshot], auto_fix_enabled: bool) -> Vec<Recommendation> {
    let mut recs: Vec<Recommendation> = platforms
        .iter()
        .flat_map(|p| p.discrepancies.iter())
        .map(|d| Recommendation::from_discrepancy(d, auto_fix_enabled))
        .collect();
    // Stable: ties keep platform / field order.
    recs.sort_by(|a, b| b.priority.cmp(&a.priority));
    recs.truncate(MAX_RECOMMENDATIONS);
    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{PlatformSnapshot, SnapshotStatus};
    use chrono::Utc;

    fn d(platform: &str, field: Field, severity: Severity, impact: ImpactCategory) -> Discrepancy {
        Discrepancy {
            field,
            component: None,
            current_value: "old".into(),
            expected_value: "new".into(),
            severity,
            impact,
            fixable: true,
            platform: platform.into(),
        }
    }

    fn snapshot(platform: &str, discrepancies: Vec<Discrepancy>) -> PlatformSnapshot {
        PlatformSnapshot {
            platform: platform.into(),
            name: None,
            address: None,
            phone: None,
            email: None,
            website: None,
            verified: false,
            last_updated: None,
            status: SnapshotStatus::Inconsistent,
            discrepancies,
            score: 0,
            failure: None,
            checked_at: Utc::now(),
        }
    }

    #[test]
    fn priority_follows_severity() {
        assert_eq!(Priority::from(Severity::Critical), Priority::Critical);
        assert_eq!(Priority::from(Severity::Major), Priority::High);
        assert_eq!(Priority::from(Severity::Minor), Priority::Medium);
    }

    #[test]
    fn impact_and_effort_mapping() {
        assert_eq!(estimated_impact(ImpactCategory::LocalPack), Level::High);
        assert_eq!(estimated_impact(ImpactCategory::Organic), Level::Medium);
        assert_eq!(estimated_impact(ImpactCategory::Citations), Level::Medium);
        assert_eq!(estimated_impact(ImpactCategory::Brand), Level::Low);
        assert_eq!(estimated_effort(Field::Phone), Level::Low);
        assert_eq!(estimated_effort(Field::Email), Level::Low);
        assert_eq!(estimated_effort(Field::Name), Level::High);
        assert_eq!(estimated_effort(Field::Address), Level::Medium);
        assert_eq!(estimated_effort(Field::Website), Level::Medium);
    }

    #[test]
    fn sorted_descending_by_priority() {
        let snaps = vec![
            snapshot("a", vec![d("a", Field::Email, Severity::Minor, ImpactCategory::Citations)]),
            snapshot("b", vec![d("b", Field::Phone, Severity::Critical, ImpactCategory::LocalPack)]),
            snapshot("c", vec![d("c", Field::Address, Severity::Major, ImpactCategory::LocalPack)]),
        ];
        let recs = generate(&snaps, false);
        let priorities: Vec<_> = recs.iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![Priority::Critical, Priority::High, Priority::Medium]);
        assert_eq!(recs[0].platform, "b");
    }

    #[test]
    fn capped_at_ten() {
        let many: Vec<_> = (0..8)
            .map(|i| d(&format!("p{i}"), Field::Email, Severity::Minor, ImpactCategory::Citations))
            .chain((0..7).map(|i| {
                d(&format!("q{i}"), Field::Phone, Severity::Critical, ImpactCategory::LocalPack)
            }))
            .collect();
        let recs = generate(&[snapshot("all", many)], false);
        assert_eq!(recs.len(), MAX_RECOMMENDATIONS);
        assert!(recs[..7].iter().all(|r| r.priority == Priority::Critical));
        assert!(recs[7..].iter().all(|r| r.priority == Priority::Medium));
    }

    #[test]
    fn auto_fix_flag_requires_config_and_fixable() {
        let mut disc = d("a", Field::Phone, Severity::Critical, ImpactCategory::LocalPack);
        assert!(Recommendation::from_discrepancy(&disc, true).auto_fix_eligible);
        assert!(!Recommendation::from_discrepancy(&disc, false).auto_fix_eligible);
        disc.fixable = false;
        assert!(!Recommendation::from_discrepancy(&disc, true).auto_fix_eligible);
    }

    #[test]
    fn steps_end_with_reaudit() {
        let disc = d("maps", Field::Name, Severity::Major, ImpactCategory::Brand);
        let rec = Recommendation::from_discrepancy(&disc, false);
        assert!(rec.steps.len() >= 3);
        assert!(rec.steps.last().unwrap().contains("Re-run the audit"));
        assert!(rec.action.contains("maps"));
    }
}
