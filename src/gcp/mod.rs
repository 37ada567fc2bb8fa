//! GCP API interaction module
//!
//! Authentication, HTTP plumbing and the Compute Engine client used by the
//! placement policy lookup.
//!
//! # Module Structure
//!
//! - [`auth`] - Credentials (ADC or static token) and gcloud defaults
//! - [`client`] - Main GCP client for making API requests
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use gcp_placement::gcp::client::{GcpClient, DEFAULT_API_ENDPOINT};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = GcpClient::new(
//!         "my-project",
//!         "us-central1",
//!         DEFAULT_API_ENDPOINT,
//!         std::time::Duration::from_secs(30),
//!     )
//!     .await?;
//!     let policies = client.get(&client.compute_regional_url("resourcePolicies")).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
