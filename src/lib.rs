//! # ryc - remote video extraction client
//!
//! Client for a remote video extraction backend. The backend fetches and
//! transcodes; this crate validates the URL, shows metadata, lets the user
//! pick a format, starts a job, polls its progress and saves the result.
//!
//! ## Features
//!
//! - URL validation before any network traffic
//! - Format ranking (video plus audio only, best quality first)
//! - Cancellable progress polling with a single active timer
//! - Non-blocking event channel for front-ends
//! - Persisted backend URL override
//!
//! ## Example
//!
//! ```rust,no_run
//! use ryc::config::ClientConfig;
//! use ryc::core::{Controller, Notifier};
//! use ryc::platform::BackendClient;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::default().with_output_dir("./downloads");
//!     let client = BackendClient::from_config(&config)?;
//!     let mut controller = Controller::new(Arc::new(client), &config, Notifier::disconnected());
//!
//!     if let Some(path) = controller.run("https://youtu.be/dQw4w9WgXcQ", None).await? {
//!         println!("Saved to {}", path.display());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod download;
pub mod error;
pub mod platform;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export main types
pub use crate::config::ClientConfig;
pub use crate::core::{ClientEvent, Controller, Format, JobStatus, Notifier, ProgressSnapshot, Session, VideoInfo};
pub use crate::error::{ErrorKind, RycError};
pub use crate::platform::{Backend, BackendClient};

/// Result type alias for ryc operations
pub type Result<T> = std::result::Result<T, RycError>;
