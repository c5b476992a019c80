//! HTTP handlers for the relay service.
//!
//! Implements:
//! - GET / - Service banner
//! - GET /health - Health check
//! - GET /terabox - One level of a share, no download links
//! - GET /terabox/files - The whole share, flattened, with download links

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::client::{resolve_surl, ShareApi};
use crate::collector::{
    FolderCollector, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_DEPTH, DEFAULT_MAX_DEPTH_LIMIT,
};
use crate::error::{RelayError, Result};
use crate::models::{
    format_size, EntryRecord, FilesResponse, ShareInfoResponse, ShareListResponse, ShareSession,
};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn ShareApi>,
    pub max_concurrency: usize,
    pub max_depth_limit: u32,
}

impl AppState {
    pub fn new(api: Arc<dyn ShareApi>) -> Self {
        Self {
            api,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            max_depth_limit: DEFAULT_MAX_DEPTH_LIMIT,
        }
    }
}

#[derive(Serialize)]
pub struct BannerResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub endpoints: [&'static str; 2],
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct InfoQuery {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct FilesQuery {
    pub url: String,
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

fn default_max_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

/// GET / - Service banner with the endpoint list.
pub async fn root_handler() -> Json<BannerResponse> {
    Json(BannerResponse {
        status: "Terabox API running",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ["/terabox", "/terabox/files"],
    })
}

/// GET /health - Health check endpoint.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /terabox - Basic share info for the root directory.
pub async fn info_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<InfoQuery>, QueryRejection>,
) -> Result<Json<ShareInfoResponse>> {
    let Query(query) = query.map_err(invalid_query)?;
    info!("Share info requested for {}", query.url);

    let surl = resolve_surl(state.api.as_ref(), &query.url).await?;
    let listing = base_listing(state.api.as_ref(), &surl).await?;

    let files: Vec<EntryRecord> = listing.list.iter().map(EntryRecord::from).collect();
    let total_folders = files.iter().filter(|f| f.is_dir).count();

    Ok(Json(ShareInfoResponse {
        success: true,
        title: listing.share_title.unwrap_or_default(),
        uk: listing.uk,
        shareid: listing.shareid,
        sign: listing.sign,
        timestamp: listing.timestamp,
        total_files: files.len() - total_folders,
        total_folders,
        files,
    }))
}

/// GET /terabox/files - Every file in the share with its download link.
pub async fn files_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<FilesQuery>, QueryRejection>,
) -> Result<Json<FilesResponse>> {
    let Query(query) = query.map_err(invalid_query)?;
    let max_depth = query.max_depth.min(state.max_depth_limit);
    info!(
        "Full listing requested for {} (max_depth {})",
        query.url, max_depth
    );

    let surl = resolve_surl(state.api.as_ref(), &query.url).await?;
    let listing = base_listing(state.api.as_ref(), &surl).await?;

    let session = ShareSession {
        surl,
        credentials: listing.credentials(),
    };
    let files = FolderCollector::with_concurrency(
        state.api.as_ref(),
        &session,
        max_depth,
        state.max_concurrency,
    )
    .collect("/")
    .await?;

    let total_size: u64 = files.iter().map(|f| f.size).sum();
    info!(
        "Collected {} file(s) from {} ({})",
        files.len(),
        session.surl,
        format_size(total_size)
    );

    Ok(Json(FilesResponse {
        success: true,
        title: listing.share_title.unwrap_or_default(),
        total_files: files.len(),
        total_size: format_size(total_size),
        files,
    }))
}

fn invalid_query(rejection: QueryRejection) -> RelayError {
    RelayError::InvalidQuery(rejection.body_text())
}

/// Fetch the root listing and turn a provider error into a client error.
async fn base_listing(api: &dyn ShareApi, surl: &str) -> Result<ShareListResponse> {
    let listing = api.fetch_share_info(surl, "/").await?;
    if !listing.is_ok() {
        return Err(RelayError::Provider {
            errno: listing.errno,
            message: listing
                .errmsg
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
        });
    }
    Ok(listing)
}

/// Create the relay router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/terabox", get(info_handler))
        .route("/terabox/files", get(files_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
