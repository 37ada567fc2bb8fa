//! Property-based tests using proptest
//!
//! These tests check cache key derivation and match selection against
//! randomized selector sets and inventories.

use gcp_placement::placement::{cache_key, select_policy, PlacementPolicy, PlacementSelectorTerm};
use proptest::prelude::*;

/// Generate a placement policy from a small name pool so matches are common
fn arb_policy() -> impl Strategy<Value = PlacementPolicy> {
    (
        prop_oneof!["compact", "spread", "batch", "web"],
        "[0-9]{1,19}",
        prop_oneof!["COLLOCATED", "UNSPECIFIED_COLLOCATION"],
    )
        .prop_map(|(name, id, collocation)| PlacementPolicy {
            name: name.to_string(),
            id,
            region: "us-central1".to_string(),
            self_link: String::new(),
            status: "READY".to_string(),
            collocation: collocation.to_string(),
            vm_count: None,
            availability_domain_count: None,
        })
}

fn arb_terms() -> impl Strategy<Value = Vec<PlacementSelectorTerm>> {
    prop::collection::vec("[a-z][a-z0-9-]{0,20}".prop_map(PlacementSelectorTerm::new), 0..8)
}

proptest! {
    /// Any permutation of a selector set maps to the same key
    #[test]
    fn key_ignores_term_order(
        (terms, shuffled) in arb_terms().prop_flat_map(|terms| {
            let shuffled = Just(terms.clone()).prop_shuffle();
            (Just(terms), shuffled)
        })
    ) {
        prop_assert_eq!(cache_key(&terms).unwrap(), cache_key(&shuffled).unwrap());
    }

    /// Adding a term that is not already present changes the key
    #[test]
    fn key_changes_when_a_term_is_added(
        terms in arb_terms(),
        extra in "[A-Z]{1,8}"
    ) {
        let mut extended = terms.clone();
        extended.push(PlacementSelectorTerm::new(extra));
        prop_assert_ne!(cache_key(&terms).unwrap(), cache_key(&extended).unwrap());
    }

    /// The selected policy is the last one in inventory order whose name
    /// matches any selector
    #[test]
    fn selection_is_last_match_in_inventory(
        policies in prop::collection::vec(arb_policy(), 0..20),
        names in prop::collection::vec(prop_oneof!["compact", "spread", "batch", "web", "none"], 0..3)
    ) {
        let selectors: Vec<PlacementSelectorTerm> =
            names.iter().map(|n| PlacementSelectorTerm::new(n.as_str())).collect();

        let expected = policies
            .iter()
            .rposition(|p| names.contains(&p.name));
        let selected = select_policy(&policies, &selectors);

        match (expected, selected) {
            (Some(index), Some(policy)) => prop_assert!(std::ptr::eq(policy, &policies[index])),
            (None, None) => {}
            (expected, selected) => prop_assert!(
                false,
                "expected index {:?}, selected {:?}",
                expected,
                selected
            ),
        }
    }

    /// Selector order never changes which policy is selected
    #[test]
    fn selection_ignores_selector_order(
        policies in prop::collection::vec(arb_policy(), 0..20),
        selectors in prop::collection::vec(
            prop_oneof!["compact", "spread", "batch"].prop_map(PlacementSelectorTerm::new),
            0..3
        )
    ) {
        let mut reversed = selectors.clone();
        reversed.reverse();
        let a = select_policy(&policies, &selectors).map(|p| p as *const PlacementPolicy);
        let b = select_policy(&policies, &reversed).map(|p| p as *const PlacementPolicy);
        prop_assert_eq!(a, b);
    }
}
