//! Placement policy descriptors and the placement class that selects them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named criterion matched against placement policy names
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacementSelectorTerm {
    pub name: String,
}

impl PlacementSelectorTerm {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The caller-side node class requesting a placement policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlacementClass {
    pub name: String,
    /// `None` means no placement was requested at all
    #[serde(default)]
    pub selector_terms: Option<Vec<PlacementSelectorTerm>>,
}

impl PlacementClass {
    pub fn new(name: impl Into<String>, selector_terms: Option<Vec<PlacementSelectorTerm>>) -> Self {
        Self {
            name: name.into(),
            selector_terms,
        }
    }
}

/// Compute Engine resource policy carrying a `groupPlacementPolicy`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementPolicy {
    pub name: String,
    pub id: String,
    pub region: String,
    pub self_link: String,
    pub status: String,
    pub collocation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_domain_count: Option<u32>,
}

impl PlacementPolicy {
    /// Whether this policy is selected by the given term
    pub fn matches(&self, term: &PlacementSelectorTerm) -> bool {
        self.name == term.name
    }

    /// Build a policy from a `resourcePolicies` item, skipping items that are
    /// not group placement policies (snapshot schedules, instance schedules)
    pub fn from_resource_policy(value: &Value) -> Option<Self> {
        let placement = value.get("groupPlacementPolicy")?;
        Some(Self::from_parts(value, placement))
    }

    fn from_parts(value: &Value, placement: &Value) -> Self {
        let str_field = |v: &Value, key: &str, default: &str| {
            v.get(key)
                .and_then(|v| v.as_str())
                .unwrap_or(default)
                .to_string()
        };
        let count_field = |key: &str| {
            placement
                .get(key)
                .and_then(|v| v.as_u64())
                .and_then(|n| u32::try_from(n).ok())
        };

        Self {
            name: str_field(value, "name", "-"),
            // int64 fields are encoded as strings in the Compute API
            id: value
                .get("id")
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_else(|| "-".to_string()),
            region: extract_short_name(&str_field(value, "region", "-")),
            self_link: str_field(value, "selfLink", ""),
            status: str_field(value, "status", "UNKNOWN"),
            collocation: str_field(placement, "collocation", "UNSPECIFIED_COLLOCATION"),
            vm_count: count_field("vmCount"),
            availability_domain_count: count_field("availabilityDomainCount"),
        }
    }
}

/// Extract short name from GCP resource URL
/// e.g., ".../projects/my-project/regions/us-central1" -> "us-central1"
fn extract_short_name(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_resource_policy() {
        let item = json!({
            "kind": "compute#resourcePolicy",
            "id": "4421590364427531234",
            "name": "spread-web",
            "region": "https://www.googleapis.com/compute/v1/projects/p/regions/us-central1",
            "selfLink": "https://www.googleapis.com/compute/v1/projects/p/regions/us-central1/resourcePolicies/spread-web",
            "status": "READY",
            "groupPlacementPolicy": {
                "availabilityDomainCount": 3,
                "collocation": "UNSPECIFIED_COLLOCATION"
            }
        });

        let policy = PlacementPolicy::from_resource_policy(&item).unwrap();
        assert_eq!(policy.name, "spread-web");
        assert_eq!(policy.id, "4421590364427531234");
        assert_eq!(policy.region, "us-central1");
        assert_eq!(policy.status, "READY");
        assert_eq!(policy.availability_domain_count, Some(3));
        assert_eq!(policy.vm_count, None);
    }

    #[test]
    fn test_non_placement_policies_are_skipped() {
        let item = json!({
            "name": "daily-snapshots",
            "snapshotSchedulePolicy": { "schedule": {} }
        });
        assert!(PlacementPolicy::from_resource_policy(&item).is_none());
    }

    #[test]
    fn test_numeric_id_is_stringified() {
        let item = json!({
            "name": "compact",
            "id": 42,
            "groupPlacementPolicy": { "collocation": "COLLOCATED", "vmCount": 8 }
        });
        let policy = PlacementPolicy::from_resource_policy(&item).unwrap();
        assert_eq!(policy.id, "42");
        assert_eq!(policy.collocation, "COLLOCATED");
        assert_eq!(policy.vm_count, Some(8));
        assert_eq!(policy.region, "-");
    }

    #[test]
    fn test_matches_by_name_only() {
        let item = json!({ "name": "a", "id": "1", "groupPlacementPolicy": {} });
        let policy = PlacementPolicy::from_resource_policy(&item).unwrap();
        assert!(policy.matches(&PlacementSelectorTerm::new("a")));
        assert!(!policy.matches(&PlacementSelectorTerm::new("1")));
    }
}
