//! Remote placement policy inventory
//!
//! [`PlacementLookup`] is the only thing the resolver needs from the remote
//! side: the full, unfiltered list of placement policies. The GCP
//! implementation walks every page of the regional `resourcePolicies` list.

use super::policy::PlacementPolicy;
use crate::gcp::client::GcpClient;
use anyhow::{Context, Result};
use serde_json::Value;
use std::future::Future;

/// Source of the full placement policy inventory
pub trait PlacementLookup: Send + Sync {
    fn describe_all(&self) -> impl Future<Output = Result<Vec<PlacementPolicy>>> + Send;
}

/// Result of one page of the list call
struct PolicyPage {
    items: Vec<PlacementPolicy>,
    next_token: Option<String>,
}

/// Lists group placement policies in the client's project and region
#[derive(Clone)]
pub struct GcpPlacementLookup {
    client: GcpClient,
}

impl GcpPlacementLookup {
    pub fn new(client: GcpClient) -> Self {
        Self { client }
    }

    async fn fetch_page(&self, page_token: Option<&str>) -> Result<PolicyPage> {
        let mut url = self.client.compute_regional_url("resourcePolicies");
        if let Some(token) = page_token {
            url = format!("{}?pageToken={}", url, urlencoding::encode(token));
        }

        let response = self
            .client
            .get(&url)
            .await
            .context("Failed to list resource policies")?;

        let items = response
            .get("items")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(PlacementPolicy::from_resource_policy)
                    .collect()
            })
            .unwrap_or_default();

        let next_token = response
            .get("nextPageToken")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        Ok(PolicyPage { items, next_token })
    }
}

impl PlacementLookup for GcpPlacementLookup {
    async fn describe_all(&self) -> Result<Vec<PlacementPolicy>> {
        let mut all_items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(page_token.as_deref()).await?;
            all_items.extend(page.items);

            match page.next_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(
            project = %self.client.project_id,
            region = %self.client.region,
            count = all_items.len(),
            "Listed placement policies"
        );

        Ok(all_items)
    }
}
