//! Client for a running relay service, plus chat-friendly formatting.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::models::{FilesResponse, ShareInfoResponse};

/// Default address of a locally running relay.
pub const DEFAULT_RELAY_URL: &str = "http://localhost:8000";

/// Basic info is a single upstream call.
const INFO_TIMEOUT: Duration = Duration::from_secs(30);

/// Large folders take a while to expand.
const FILES_TIMEOUT: Duration = Duration::from_secs(120);

/// Number of files listed by [`format_file_list`].
const MAX_LISTED_FILES: usize = 20;

/// Thin client over the relay's HTTP API.
pub struct RelayClient {
    base_url: String,
    http: Client,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Basic, non-recursive share info. `None` on any failure.
    pub async fn get_info(&self, url: &str) -> Option<ShareInfoResponse> {
        self.get_json("/terabox", &[("url", url.to_string())], INFO_TIMEOUT)
            .await
    }

    /// Every file in the share with its download link. `None` on any failure.
    pub async fn get_all_files(&self, url: &str, max_depth: u32) -> Option<FilesResponse> {
        self.get_json(
            "/terabox/files",
            &[("url", url.to_string()), ("max_depth", max_depth.to_string())],
            FILES_TIMEOUT,
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Option<T> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .timeout(timeout)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                warn!("Relay request {} failed: {}", path, e);
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            warn!("Relay request {} returned {}", path, response.status());
            return None;
        }

        match response.json::<T>().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("Relay response {} could not be decoded: {}", path, e);
                None
            }
        }
    }
}

/// Render a full listing as a Markdown message for a chat client.
///
/// At most 20 files are listed; the rest are summarised in a final line.
pub fn format_file_list(data: Option<&FilesResponse>) -> String {
    let data = match data {
        Some(data) if data.success => data,
        _ => return "Failed to fetch data from Terabox".to_string(),
    };

    let title = if data.title.is_empty() {
        "Untitled"
    } else {
        data.title.as_str()
    };

    let mut text = format!("**{}**\n", title);
    text.push_str(&format!(
        "Total: {} file(s) ({})\n\n",
        data.total_files, data.total_size
    ));

    for (i, file) in data.files.iter().take(MAX_LISTED_FILES).enumerate() {
        text.push_str(&format!(
            "{}. `{}` - {}\n",
            i + 1,
            file.file_name,
            file.size_readable
        ));
        if let Some(url) = &file.download_url {
            text.push_str(&format!("   [Download]({})\n", url));
        }
    }

    if data.total_files > MAX_LISTED_FILES {
        text.push_str(&format!(
            "\n... and {} more files",
            data.total_files - MAX_LISTED_FILES
        ));
    }

    text
}
