//! HTTP client for the secrets API.
//!
//! Fetches sealed bundles for a workspace. Requests carry a bearer token
//! when one is configured. There is no retry: a failed request is a failed
//! pull.

use crate::config::PullConfig;
use crate::error::{FetchError, FetchResult, PullError, PullResult};
use crate::types::{FileBundle, FileResponse, SecretsBundle, SecretsResponse};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retrieves sealed bundles addressed by workspace id.
pub trait BundleFetcher: Send + Sync {
    fn get_file(&self, workspace_id: &str) -> impl Future<Output = FetchResult<FileBundle>> + Send;

    fn get_secrets(
        &self,
        workspace_id: &str,
    ) -> impl Future<Output = FetchResult<SecretsBundle>> + Send;
}

/// HTTP client for the bundle endpoints.
pub struct BundleApiClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl BundleApiClient {
    pub fn new(config: &PullConfig) -> PullResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| PullError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            access_token: config.access_token.clone(),
        })
    }

    /// Makes a GET request and maps non-success statuses to fetch errors.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, workspace_id: &str) -> FetchResult<T> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        let status = resp.status();
        debug!("GET {path} -> {status}");

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FetchError::Unauthorized(workspace_id.to_string()));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(workspace_id.to_string()));
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| FetchError::Malformed(format!("unexpected response body: {e}")))
    }
}

impl BundleFetcher for BundleApiClient {
    async fn get_file(&self, workspace_id: &str) -> FetchResult<FileBundle> {
        let resp: FileResponse = self
            .get_json(&format!("/api/v1/workspace/{workspace_id}/file"), workspace_id)
            .await?;
        FileBundle::try_from(resp)
    }

    async fn get_secrets(&self, workspace_id: &str) -> FetchResult<SecretsBundle> {
        let resp: SecretsResponse = self
            .get_json(&format!("/api/v1/workspace/{workspace_id}/secrets"), workspace_id)
            .await?;
        let bundle = SecretsBundle::try_from(resp)?;
        debug!(
            "fetched {} sealed secrets for workspace {workspace_id}",
            bundle.secrets.len()
        );
        Ok(bundle)
    }
}
