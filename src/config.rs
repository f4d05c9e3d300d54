//! Client configuration and the persisted backend override

use crate::error::RycError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Backend used when nothing else is configured
pub const DEFAULT_BACKEND_URL: &str = "https://supreme-yt-downloader-backend-zbl1.onrender.com";

/// Environment variable consulted for the backend URL
pub const BACKEND_URL_ENV: &str = "RYC_BACKEND_URL";

/// Interval between two progress polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Time the completion state stays visible before the session resets
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(3);

/// Runtime configuration of a client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub backend_url: Url,
    pub poll_interval: Duration,
    pub reset_delay: Duration,
    /// `None` waits for the backend indefinitely
    pub request_timeout: Option<Duration>,
    pub user_agent: Option<String>,
    pub proxy: Option<String>,
    pub output_dir: PathBuf,
    /// Consecutive failed polls tolerated before giving up; `None` polls forever
    pub max_poll_failures: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            reset_delay: DEFAULT_RESET_DELAY,
            request_timeout: None,
            user_agent: None,
            proxy: None,
            output_dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
            max_poll_failures: None,
        }
    }
}

impl ClientConfig {
    pub fn new(backend_url: Url) -> Self {
        Self {
            backend_url,
            ..Default::default()
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_max_poll_failures(mut self, max: Option<u32>) -> Self {
        self.max_poll_failures = max;
        self
    }
}

fn default_backend_url() -> Url {
    // The constant is a well-formed absolute URL
    Url::parse(DEFAULT_BACKEND_URL).unwrap()
}

/// Parse and check a backend base URL
pub fn parse_backend_url(raw: &str) -> Result<Url, RycError> {
    let url = Url::parse(raw.trim())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(RycError::Config(format!(
            "Backend URL must use http or https: {}",
            url
        )));
    }
    if url.cannot_be_a_base() {
        return Err(RycError::Config(format!("Invalid backend URL: {}", url)));
    }
    Ok(url)
}

/// Pick the backend URL: explicit value, then persisted override, then default.
///
/// Blank values are skipped. An explicit value that does not parse is an error;
/// a broken persisted value falls through to the default.
pub fn resolve_backend_url(
    explicit: Option<&str>,
    persisted: Option<&str>,
) -> Result<Url, RycError> {
    if let Some(raw) = explicit.filter(|s| !s.trim().is_empty()) {
        return parse_backend_url(raw);
    }

    if let Some(raw) = persisted.filter(|s| !s.trim().is_empty()) {
        match parse_backend_url(raw) {
            Ok(url) => {
                debug!("Using persisted backend URL {}", url);
                return Ok(url);
            }
            Err(e) => tracing::warn!("Ignoring persisted backend URL {:?}: {}", raw, e),
        }
    }

    Ok(default_backend_url())
}

/// Contents of the settings file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_url: Option<String>,
}

/// JSON settings file holding the persisted backend override
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `<config dir>/ryc/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ryc").join("settings.json"))
    }

    /// Store at the default location
    pub fn open_default() -> Result<Self, RycError> {
        Self::default_path()
            .map(Self::new)
            .ok_or_else(|| RycError::Config("No configuration directory available".to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings; a missing file yields defaults
    pub fn load(&self) -> Result<Settings, RycError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist a backend override. Takes effect on the next run.
    pub fn save_backend_url(&self, raw: &str) -> Result<Url, RycError> {
        let url = parse_backend_url(raw)?;
        let mut settings = self.load().unwrap_or_default();
        settings.backend_url = Some(url.to_string());
        self.write(&settings)?;
        info!("Saved backend URL {} to {:?}", url, self.path);
        Ok(url)
    }

    /// Remove the persisted override
    pub fn clear_backend_url(&self) -> Result<(), RycError> {
        let mut settings = self.load().unwrap_or_default();
        settings.backend_url = None;
        self.write(&settings)?;
        info!("Cleared backend URL in {:?}", self.path);
        Ok(())
    }

    fn write(&self, settings: &Settings) -> Result<(), RycError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}
