use std::time::Duration;

use serde::de::DeserializeOwned;
use tether_common::TetherError;
use tether_common::protocol::{Target, VersionInfo};
use tether_common::selection::TargetPolicy;
use tracing::{debug, info};

/// Client for the HTTP discovery endpoints (`/json/list`, `/json/version`).
///
/// Nothing is cached: the editor opens and closes surfaces while the user
/// works, so every call re-reads the list.
#[derive(Debug, Clone)]
pub struct TargetDirectory {
    base_url: String,
    client: reqwest::Client,
}

impl TargetDirectory {
    pub fn new(host: &str, port: u16, timeout: Duration) -> Result<Self, TetherError> {
        Self::with_base_url(format!("http://{}:{}", host, port), timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TetherError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TetherError::protocol(format!("failed to build http client: {}", e)))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_targets(&self) -> Result<Vec<Target>, TetherError> {
        let targets: Vec<Target> = self.get_json("/json/list").await?;
        debug!(count = targets.len(), "listed targets");
        Ok(targets)
    }

    pub async fn version(&self) -> Result<VersionInfo, TetherError> {
        self.get_json("/json/version").await
    }

    /// List targets and pick the editor window according to `policy`.
    pub async fn select_editor_target(&self, policy: &TargetPolicy) -> Result<Target, TetherError> {
        let targets = self.list_targets().await?;
        let target = policy.select(&targets)?.clone();
        info!(id = %target.id, title = %target.title, "selected editor target");
        Ok(target)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TetherError> {
        let endpoint = format!("{}{}", self.base_url, path);
        let unavailable = |reason: String| TetherError::DiscoveryUnavailable {
            endpoint: endpoint.clone(),
            reason,
        };

        let response = self
            .client
            .get(&endpoint)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("unexpected status {}", status)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| unavailable(format!("malformed response: {}", e)))
    }
}
