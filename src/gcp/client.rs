//! GCP Client
//!
//! Main client for interacting with GCP APIs, combining authentication
//! and HTTP functionality.

use super::auth::GcpCredentials;
use super::http::GcpHttpClient;
use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;

/// Public Compute Engine endpoint
pub const DEFAULT_API_ENDPOINT: &str = "https://compute.googleapis.com";

/// Main GCP client
#[derive(Clone)]
pub struct GcpClient {
    pub credentials: GcpCredentials,
    pub http: GcpHttpClient,
    pub project_id: String,
    pub region: String,
    /// Base URL of the Compute API, without trailing slash
    pub endpoint: String,
}

impl GcpClient {
    /// Create a new GCP client using Application Default Credentials
    pub async fn new(
        project_id: &str,
        region: &str,
        endpoint: &str,
        request_timeout: Duration,
    ) -> Result<Self> {
        let credentials = GcpCredentials::new()
            .await
            .context("Failed to initialize GCP credentials")?;

        Self::with_credentials(credentials, project_id, region, endpoint, request_timeout)
    }

    /// Create a client with explicit credentials
    pub fn with_credentials(
        credentials: GcpCredentials,
        project_id: &str,
        region: &str,
        endpoint: &str,
        request_timeout: Duration,
    ) -> Result<Self> {
        let http = GcpHttpClient::new(request_timeout)?;

        Ok(Self {
            credentials,
            http,
            project_id: project_id.to_string(),
            region: region.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &str) -> Result<Value> {
        let token = self.credentials.get_token().await?;
        self.http.get(url, &token).await
    }

    /// Build Compute Engine API URL
    pub fn compute_url(&self, path: &str) -> String {
        format!(
            "{}/compute/v1/projects/{}/{}",
            self.endpoint, self.project_id, path
        )
    }

    /// Build regional Compute Engine API URL
    pub fn compute_regional_url(&self, resource: &str) -> String {
        self.compute_url(&format!("regions/{}/{}", self.region, resource))
    }
}

/// Format a GCP API error for display
pub fn format_gcp_error(error: &anyhow::Error) -> String {
    super::http::format_gcp_error(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(endpoint: &str) -> GcpClient {
        GcpClient::with_credentials(
            GcpCredentials::from_access_token("token"),
            "my-project",
            "us-central1",
            endpoint,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_compute_regional_url() {
        let client = test_client(DEFAULT_API_ENDPOINT);
        assert_eq!(
            client.compute_regional_url("resourcePolicies"),
            "https://compute.googleapis.com/compute/v1/projects/my-project/regions/us-central1/resourcePolicies"
        );
    }

    #[test]
    fn test_endpoint_trailing_slash_is_trimmed() {
        let client = test_client("http://127.0.0.1:8080/");
        assert_eq!(
            client.compute_url("global/networks"),
            "http://127.0.0.1:8080/compute/v1/projects/my-project/global/networks"
        );
    }
}
