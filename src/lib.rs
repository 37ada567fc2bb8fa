//! Resolve placement selector terms to GCP Compute Engine placement policies.
//!
//! - [`placement`] - Resolver, cache, change monitor and the remote lookup
//! - [`gcp`] - Credentials, HTTP plumbing and Compute URL helpers
//! - [`config`] - Persisted user configuration

pub mod config;
pub mod gcp;
pub mod placement;
