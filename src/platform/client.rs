//! HTTP client for the extraction backend

use crate::config::ClientConfig;
use crate::core::progress::ProgressSnapshot;
use crate::core::video_info::VideoInfo;
use crate::download::RetrievedFile;
use crate::error::RycError;
use crate::platform::api::{DownloadRequest, DownloadResponse, InfoRequest, InfoResponse};
use crate::platform::backend::Backend;
use crate::utils::filename::{resolve_filename, FALLBACK_FILENAME};
use async_trait::async_trait;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// HTTP client configuration
#[derive(Debug, Clone, Default)]
pub struct HttpClientConfig {
    /// Request timeout; `None` waits for the backend indefinitely
    pub timeout: Option<Duration>,
    /// User agent string
    pub user_agent: Option<String>,
    /// Proxy URL
    pub proxy_url: Option<String>,
}

/// Backend reached over HTTP
pub struct BackendClient {
    client: Client,
    base_url: Url,
    config: HttpClientConfig,
}

impl BackendClient {
    /// Create a client with default configuration
    pub fn new(base_url: Url) -> Result<Self, RycError> {
        Self::with_config(base_url, HttpClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(base_url: Url, config: HttpClientConfig) -> Result<Self, RycError> {
        if base_url.cannot_be_a_base() {
            return Err(RycError::Config(format!(
                "Backend URL cannot be used as a base: {}",
                base_url
            )));
        }

        let mut builder = ClientBuilder::new().gzip(true).brotli(true);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("ryc/{}", env!("CARGO_PKG_VERSION")));
        builder = builder.user_agent(user_agent);

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| RycError::Config(format!("Invalid proxy {}: {}", proxy_url, e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| RycError::Config(format!("Failed to build HTTP client: {}", e)))?;

        info!("Backend client ready for {}", base_url);
        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Create a client from the runtime configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self, RycError> {
        Self::with_config(
            config.backend_url.clone(),
            HttpClientConfig {
                timeout: config.request_timeout,
                user_agent: config.user_agent.clone(),
                proxy_url: config.proxy.clone(),
            },
        )
    }

    /// Backend base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Build an endpoint URL below the base, percent-encoding each segment
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, RycError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                RycError::Config(format!("Backend URL cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl Backend for BackendClient {
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo, RycError> {
        let endpoint = self.endpoint(&["info"])?;
        debug!("POST {}", endpoint);

        let response = self
            .client
            .post(endpoint)
            .json(&InfoRequest { url })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Info request failed with status {}", status);
            return Err(RycError::Backend(format!("Server error: {}", status.as_u16())));
        }

        let body: InfoResponse = response.json().await?;
        let info = body.into_video_info()?;
        debug!(
            "Received info for {:?} with {} formats",
            info.title,
            info.formats.len()
        );
        Ok(info)
    }

    async fn start_download(&self, url: &str, format_id: &str) -> Result<String, RycError> {
        let endpoint = self.endpoint(&["download"])?;
        debug!("POST {} (format {})", endpoint, format_id);

        let response = self
            .client
            .post(endpoint)
            .json(&DownloadRequest { url, format_id })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Download request failed with status {}", status);
            return Err(RycError::Backend(format!("Server error: {}", status.as_u16())));
        }

        let body: DownloadResponse = response.json().await?;
        body.into_job_id()
    }

    async fn fetch_progress(&self, job_id: &str) -> Result<ProgressSnapshot, RycError> {
        let endpoint = self.endpoint(&["progress", job_id])?;

        let response = self.client.get(endpoint).send().await?;
        if !response.status().is_success() {
            // The body still carries the job status when there is one
            debug!("Progress request returned status {}", response.status());
        }

        Ok(response.json().await?)
    }

    async fn fetch_file(&self, job_id: &str) -> Result<RetrievedFile, RycError> {
        let endpoint = self.endpoint(&["get_file", job_id])?;
        debug!("GET {}", endpoint);

        let response = self.client.get(endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("File request failed with status {}", status);
            return Err(RycError::Retrieval("File not ready yet".to_string()));
        }

        let disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let filename = resolve_filename(disposition.as_deref(), FALLBACK_FILENAME);

        let bytes = response.bytes().await?;
        debug!("Fetched {} bytes as {}", bytes.len(), filename);
        Ok(RetrievedFile::new(filename, bytes.to_vec()))
    }
}
