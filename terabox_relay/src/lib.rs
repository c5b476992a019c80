//! terabox_relay - An HTTP relay that flattens TeraBox shared folders.
//!
//! This library provides functionality to:
//! - Extract a share token from the usual TeraBox link shapes
//! - List one directory of a share
//! - Expand a whole share into files with direct download links
//! - Serve both listings over HTTP
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use terabox_relay::{resolve_surl, FolderCollector, ShareApi, ShareSession, TeraboxClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = TeraboxClient::new(Duration::from_secs(30))?;
//!
//!     let surl = resolve_surl(&client, "https://www.terabox.com/s/1AbC").await?;
//!     let listing = client.fetch_share_info(&surl, "/").await?;
//!     let session = ShareSession { surl, credentials: listing.credentials() };
//!
//!     let files = FolderCollector::new(&client, &session, 5).collect("/").await?;
//!     for file in files {
//!         println!("{}\t{}", file.size_readable, file.path);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod collector;
pub mod config;
pub mod error;
pub mod models;
pub mod relay_client;
pub mod server;
pub mod url_parser;

// Re-exports for convenience
pub use client::{resolve_surl, ShareApi, TeraboxClient};
pub use collector::FolderCollector;
pub use error::{RelayError, Result};
pub use models::{format_size, FileRecord, ShareCredentials, ShareSession};
pub use relay_client::{format_file_list, RelayClient};
pub use server::{create_router, AppState};
pub use url_parser::extract_surl;
