//! Placement Resolver
//!
//! Maps a placement class's selector terms to at most one placement policy.
//! Every resolution runs under one async lock: cache check, remote lookup,
//! filtering and cache store happen as a unit, so at most one lookup is in
//! flight and concurrent misses cannot race on the same key.

use super::cache::{CacheStore, CachedPlacement};
use super::change_monitor::ChangeMonitor;
use super::key::cache_key;
use super::lookup::PlacementLookup;
use super::policy::{PlacementClass, PlacementPolicy, PlacementSelectorTerm};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors surfaced by [`Resolver::get`]
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The selector terms could not be turned into a cache key
    #[error("failed to hash placement selector terms")]
    HashFailed(#[source] serde_json::Error),

    /// The remote inventory call failed or timed out
    #[error("failed to look up placement policies")]
    LookupFailed(#[source] anyhow::Error),
}

/// Outcome of a successful resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The class carries no selector terms
    NotRequested,
    /// Selector terms were given but no policy matched
    NoMatch,
    Matched(PlacementPolicy),
}

impl Resolution {
    pub fn policy(&self) -> Option<&PlacementPolicy> {
        match self {
            Resolution::Matched(policy) => Some(policy),
            _ => None,
        }
    }

    fn from_cached(cached: CachedPlacement) -> Self {
        cached.map_or(Resolution::NoMatch, Resolution::Matched)
    }
}

/// Per-call context supplied by the caller
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveContext {
    /// Distinguishes legacy node templates from node classes; only affects
    /// the change-monitor scope
    pub is_node_template: bool,
    /// Upper bound on the remote lookup
    pub timeout: Option<Duration>,
}

impl ResolveContext {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Resolves selector terms to a placement policy through a TTL cache
pub struct Resolver<L, C> {
    lookup: L,
    cache: C,
    monitor: ChangeMonitor<CachedPlacement>,
    lock: Mutex<()>,
}

impl<L: PlacementLookup, C: CacheStore> Resolver<L, C> {
    pub fn new(lookup: L, cache: C) -> Self {
        Self {
            lookup,
            cache,
            monitor: ChangeMonitor::new(),
            lock: Mutex::new(()),
        }
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn monitor(&self) -> &ChangeMonitor<CachedPlacement> {
        &self.monitor
    }

    /// Resolve the placement policy selected by `class`
    pub async fn get(
        &self,
        ctx: &ResolveContext,
        class: &PlacementClass,
    ) -> Result<Resolution, ResolveError> {
        let Some(selectors) = class.selector_terms.as_deref() else {
            return Ok(Resolution::NotRequested);
        };

        let _guard = self.lock.lock().await;

        let key = cache_key(selectors).map_err(ResolveError::HashFailed)?;
        let resolved = match self.cache.get(&key) {
            Some(cached) => cached,
            None => {
                let policies = self.describe_all(ctx).await?;
                let resolved = select_policy(&policies, selectors).cloned();
                self.cache.set(key, resolved.clone());
                resolved
            }
        };

        let scope = format!("placementGroups/{}/{}", ctx.is_node_template, class.name);
        if self.monitor.has_changed(&scope, &resolved) {
            tracing::debug!(
                class = %class.name,
                placement_group = ?resolved,
                "discovered placement groups"
            );
        }

        Ok(Resolution::from_cached(resolved))
    }

    async fn describe_all(&self, ctx: &ResolveContext) -> Result<Vec<PlacementPolicy>, ResolveError> {
        let result = match ctx.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, self.lookup.describe_all()).await {
                Ok(result) => result,
                Err(elapsed) => Err(anyhow::Error::new(elapsed)
                    .context(format!("placement lookup exceeded {:?}", timeout))),
            },
            None => self.lookup.describe_all().await,
        };

        result.map_err(|err| {
            tracing::debug!(error = ?err, "Error from compute:resourcePolicies.list");
            ResolveError::LookupFailed(err)
        })
    }
}

/// Pick the policy selected by `selectors`.
///
/// Every policy is checked in inventory order and a later match replaces an
/// earlier one, so the last matching policy wins.
pub fn select_policy<'a>(
    policies: &'a [PlacementPolicy],
    selectors: &[PlacementSelectorTerm],
) -> Option<&'a PlacementPolicy> {
    let mut selected = None;
    for policy in policies {
        if selectors.iter().any(|term| policy.matches(term)) {
            selected = Some(policy);
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(name: &str, id: &str) -> PlacementPolicy {
        PlacementPolicy {
            name: name.to_string(),
            id: id.to_string(),
            region: "us-central1".to_string(),
            self_link: String::new(),
            status: "READY".to_string(),
            collocation: "COLLOCATED".to_string(),
            vm_count: None,
            availability_domain_count: None,
        }
    }

    fn terms(names: &[&str]) -> Vec<PlacementSelectorTerm> {
        names.iter().map(|n| PlacementSelectorTerm::new(*n)).collect()
    }

    #[test]
    fn test_last_matching_policy_wins() {
        let policies = vec![policy("a", "1"), policy("b", "2"), policy("a", "3")];
        let selected = select_policy(&policies, &terms(&["a"])).unwrap();
        assert_eq!(selected.id, "3");
        assert!(std::ptr::eq(selected, &policies[2]));
    }

    #[test]
    fn test_distinct_matches_collapse_to_last() {
        let policies = vec![policy("a", "1"), policy("b", "2"), policy("c", "3")];
        let selected = select_policy(&policies, &terms(&["b", "a"])).unwrap();
        assert_eq!(selected.name, "b");
    }

    #[test]
    fn test_no_match_and_empty_selectors() {
        let policies = vec![policy("a", "1")];
        assert!(select_policy(&policies, &terms(&["z"])).is_none());
        assert!(select_policy(&policies, &[]).is_none());
        assert!(select_policy(&[], &terms(&["a"])).is_none());
    }

    #[test]
    fn test_resolution_accessors() {
        let matched = Resolution::Matched(policy("a", "1"));
        assert_eq!(matched.policy().map(|p| p.name.as_str()), Some("a"));
        assert!(Resolution::NoMatch.policy().is_none());
        assert!(Resolution::NotRequested.policy().is_none());
        assert_eq!(Resolution::from_cached(None), Resolution::NoMatch);
    }
}
