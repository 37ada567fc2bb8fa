//! Placement policy resolution
//!
//! Resolves the placement selector terms of a [`PlacementClass`] to a single
//! Compute Engine group placement policy, caching the outcome so repeated
//! resolutions skip the Compute API.
//!
//! # Architecture
//!
//! - [`resolver`] - Serialized cache-then-lookup resolution and match selection
//! - [`key`] - Order-independent cache keys for selector sets
//! - [`cache`] - TTL store for resolved policies (Moka)
//! - [`lookup`] - Remote inventory of placement policies (Compute REST API)
//! - [`change_monitor`] - Suppresses repeated logging of unchanged results
//!
//! # Example
//!
//! ```ignore
//! use gcp_placement::placement::*;
//!
//! async fn resolve(lookup: GcpPlacementLookup) -> anyhow::Result<()> {
//!     let cache = MokaPlacementCache::new(1024, std::time::Duration::from_secs(300));
//!     let resolver = Resolver::new(lookup, cache);
//!     let class = PlacementClass::new("web", Some(vec![PlacementSelectorTerm::new("spread-web")]));
//!     let resolution = resolver.get(&ResolveContext::default(), &class).await?;
//!     println!("{:?}", resolution.policy());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod change_monitor;
pub mod key;
pub mod lookup;
mod policy;
pub mod resolver;

pub use cache::{CacheStore, CachedPlacement, MokaPlacementCache};
pub use change_monitor::ChangeMonitor;
pub use key::{cache_key, CacheKey};
pub use lookup::{GcpPlacementLookup, PlacementLookup};
pub use policy::{PlacementClass, PlacementPolicy, PlacementSelectorTerm};
pub use resolver::{select_policy, ResolveContext, ResolveError, Resolution, Resolver};
