//! TeraBox share API client.
//!
//! Every assumption about the provider's request and response shapes lives
//! here, behind the [`ShareApi`] trait, so traversal logic never touches
//! the wire format.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER, USER_AGENT};
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{RelayError, Result};
use crate::models::{DownloadResponse, ShareCredentials, ShareListResponse};
use crate::url_parser::extract_surl;

/// Default TeraBox web origin.
pub const DEFAULT_BASE_URL: &str = "https://www.terabox.com";

/// Application id the web client sends with every call.
const APP_ID: &str = "250528";

/// Page size for directory listings. Only the first page is read.
const PAGE_SIZE: &str = "1000";

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          Chrome/120.0.0.0 Safari/537.36";

/// The upstream calls the relay depends on.
#[async_trait]
pub trait ShareApi: Send + Sync {
    /// List one directory of a share.
    ///
    /// The body is returned whatever its `errno`; callers decide what a
    /// provider error means. Transport and decode failures are errors.
    async fn fetch_share_info(&self, surl: &str, dir: &str) -> Result<ShareListResponse>;

    /// Resolve the direct download URL of one file.
    ///
    /// Best effort: any failure yields `None`.
    async fn fetch_download_link(
        &self,
        credentials: &ShareCredentials,
        fs_id: &str,
    ) -> Option<String>;

    /// GET `url` following redirects and return the final URL.
    async fn follow_redirects(&self, url: &str) -> Result<String>;
}

/// Client for the TeraBox share web API.
#[derive(Clone)]
pub struct TeraboxClient {
    base_url: String,
    http: Client,
}

impl TeraboxClient {
    /// Create a client against the public TeraBox origin.
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    /// Create a client against a custom origin (mirror domain or test server).
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .default_headers(browser_headers(base_url))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn try_fetch_download_link(
        &self,
        credentials: &ShareCredentials,
        fs_id: &str,
    ) -> Result<Option<String>> {
        let fid_list = format!("[{}]", fs_id);
        let response = self
            .http
            .get(format!("{}/api/download", self.base_url))
            .query(&[
                ("app_id", APP_ID),
                ("uk", credentials.uk.as_str()),
                ("shareid", credentials.shareid.as_str()),
                ("sign", credentials.sign.as_str()),
                ("timestamp", credentials.timestamp.as_str()),
                ("fid_list", fid_list.as_str()),
            ])
            .send()
            .await?;

        let body = response.text().await?;
        let parsed: DownloadResponse = serde_json::from_str(&body)?;

        if parsed.errno != 0 {
            debug!("download errno {} for fs_id {}", parsed.errno, fs_id);
            return Ok(None);
        }

        Ok(parsed.dlink.into_iter().next().and_then(|link| link.url))
    }
}

#[async_trait]
impl ShareApi for TeraboxClient {
    async fn fetch_share_info(&self, surl: &str, dir: &str) -> Result<ShareListResponse> {
        debug!("Listing {} in share {}", dir, surl);

        let response = self
            .http
            .get(format!("{}/api/shorturlinfo", self.base_url))
            .query(&[
                ("app_id", APP_ID),
                ("shorturl", surl),
                ("root", "1"),
                ("dir", dir),
                ("page", "1"),
                ("num", PAGE_SIZE),
                ("order", "name"),
                ("desc", "0"),
            ])
            .send()
            .await?;

        // The provider does not reliably label JSON bodies, so decode the text.
        let body = response.text().await?;
        let listing: ShareListResponse = serde_json::from_str(&body)?;
        Ok(listing)
    }

    async fn fetch_download_link(
        &self,
        credentials: &ShareCredentials,
        fs_id: &str,
    ) -> Option<String> {
        match self.try_fetch_download_link(credentials, fs_id).await {
            Ok(Some(url)) => Some(url),
            Ok(None) => {
                warn!("No download link for fs_id {}", fs_id);
                None
            }
            Err(e) => {
                warn!("Download link lookup failed for fs_id {}: {}", fs_id, e);
                None
            }
        }
    }

    async fn follow_redirects(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| RelayError::Redirect(e.to_string()))?;
        Ok(response.url().to_string())
    }
}

/// Resolve the share token of a user-supplied link.
///
/// Links without a recognisable token are fetched once with redirects
/// followed and the final URL is parsed again. A transport failure there is
/// reported as [`RelayError::Redirect`], distinct from "no token".
pub async fn resolve_surl(api: &dyn ShareApi, url: &str) -> Result<String> {
    if let Some(surl) = extract_surl(url) {
        return Ok(surl);
    }

    debug!("No surl in {}, following redirects", url);
    let final_url = api.follow_redirects(url).await?;

    extract_surl(&final_url).ok_or_else(|| RelayError::InvalidShareUrl(url.to_string()))
}

/// Headers the provider expects from a browser session.
fn browser_headers(base_url: &str) -> HeaderMap {
    let origin = base_url.trim_end_matches('/');
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    if let Ok(referer) = HeaderValue::from_str(&format!("{}/", origin)) {
        headers.insert(REFERER, referer);
    }
    if let Ok(origin) = HeaderValue::from_str(origin) {
        headers.insert(ORIGIN, origin);
    }
    headers
}
