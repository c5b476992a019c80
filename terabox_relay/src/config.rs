//! Command-line and environment configuration.

use std::time::Duration;

use clap::Args;

use crate::client::{TeraboxClient, DEFAULT_BASE_URL};
use crate::collector::{DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_DEPTH_LIMIT};
use crate::error::Result;

/// How to reach the TeraBox provider.
#[derive(Args, Debug, Clone)]
pub struct ProviderConfig {
    /// TeraBox web origin.
    #[arg(long = "provider-url", env = "TERABOX_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Per-request timeout for upstream calls, in seconds.
    #[arg(long, env = "TERABOX_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    pub fn build_client(&self) -> Result<TeraboxClient> {
        TeraboxClient::with_base_url(&self.base_url, Duration::from_secs(self.timeout_secs))
    }
}

/// Settings for the HTTP service.
#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Maximum concurrent upstream requests per traversal.
    #[arg(long, env = "MAX_CONCURRENCY", default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Upper bound applied to the `max_depth` query parameter.
    #[arg(long, env = "MAX_DEPTH_LIMIT", default_value_t = DEFAULT_MAX_DEPTH_LIMIT)]
    pub max_depth_limit: u32,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
