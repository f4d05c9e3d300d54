//! Command line argument parsing

use crate::config::{ClientConfig, BACKEND_URL_ENV};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// ryc - fetch videos through a remote extraction backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Video URL (watch page, short link or embed link)
    pub url: Option<String>,

    /// Format ID to fetch instead of the best available one
    #[arg(short, long, value_name = "ID")]
    pub format: Option<String>,

    /// Show video information and formats, then exit
    #[arg(short = 'F', long)]
    pub list_formats: bool,

    /// Output directory (defaults to the downloads folder)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Backend base URL for this run
    #[arg(long, value_name = "URL", env = BACKEND_URL_ENV)]
    pub backend_url: Option<String>,

    /// Save a backend base URL for future runs and exit
    #[arg(long, value_name = "URL", conflicts_with = "clear_backend_url")]
    pub set_backend_url: Option<String>,

    /// Forget the saved backend base URL and exit
    #[arg(long)]
    pub clear_backend_url: bool,

    /// Interval between progress checks (e.g., 1s, 500ms)
    #[arg(long, value_name = "DURATION", default_value = "1s")]
    pub poll_interval: humantime::Duration,

    /// How long the completion state stays before the session resets
    #[arg(long, value_name = "DURATION", default_value = "3s")]
    pub reset_delay: humantime::Duration,

    /// HTTP timeout (e.g., 30s, 1m); no timeout when omitted
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<humantime::Duration>,

    /// Give up after this many failed progress checks in a row
    #[arg(long, value_name = "N")]
    pub max_poll_failures: Option<u32>,

    /// Override User-Agent header
    #[arg(long, value_name = "USER_AGENT")]
    pub user_agent: Option<String>,

    /// Proxy URL (http/https/socks)
    #[arg(long, value_name = "URL")]
    pub proxy: Option<String>,

    /// Disable progress output
    #[arg(long)]
    pub no_progress: bool,

    /// Verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Quiet output (only errors)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Get HTTP timeout as Duration
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.map(Into::into)
    }

    pub fn poll_interval_duration(&self) -> Duration {
        self.poll_interval.into()
    }

    pub fn reset_delay_duration(&self) -> Duration {
        self.reset_delay.into()
    }

    /// Check if this run only manages the saved backend URL
    pub fn is_settings_command(&self) -> bool {
        self.set_backend_url.is_some() || self.clear_backend_url
    }

    /// Build the client configuration for a resolved backend URL
    pub fn client_config(&self, backend_url: Url) -> ClientConfig {
        let mut config = ClientConfig::new(backend_url)
            .with_poll_interval(self.poll_interval_duration())
            .with_reset_delay(self.reset_delay_duration())
            .with_request_timeout(self.timeout_duration())
            .with_user_agent(self.user_agent.clone())
            .with_proxy(self.proxy.clone())
            .with_max_poll_failures(self.max_poll_failures);

        if let Some(output) = &self.output {
            config = config.with_output_dir(output);
        }

        config
    }

    /// Get output verbosity level
    pub fn verbosity_level(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbosityLevel {
    /// Quiet (only errors)
    Quiet,
    /// Normal
    Normal,
    /// Verbose (debug info)
    Verbose,
}


impl Default for Args {
    fn default() -> Self {
        Self {
            url: None,
            format: None,
            list_formats: false,
            output: None,
            backend_url: None,
            set_backend_url: None,
            clear_backend_url: false,
            poll_interval: humantime::Duration::from(Duration::from_secs(1)),
            reset_delay: humantime::Duration::from(Duration::from_secs(3)),
            timeout: None,
            max_poll_failures: None,
            user_agent: None,
            proxy: None,
            no_progress: false,
            verbose: false,
            quiet: false,
        }
    }
}
