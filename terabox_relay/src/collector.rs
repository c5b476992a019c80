//! Recursive expansion of a share into a flat list of files.

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::client::ShareApi;
use crate::error::{RelayError, Result};
use crate::models::{FileRecord, ShareEntry, ShareListResponse, ShareSession};

/// Default cap on concurrent upstream requests during one traversal.
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// Default recursion limit for `/terabox/files`.
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// Default upper bound a caller may request for `max_depth`.
pub const DEFAULT_MAX_DEPTH_LIMIT: u32 = 20;

/// Walks a share depth-first, expanding sibling folders concurrently.
///
/// Output order is fixed by the listing, not by completion: a directory's
/// own files come first, followed by each subdirectory's files in the
/// order the provider listed the subdirectories.
///
/// Failures below the root never abort the walk. A provider error or a
/// transport failure in a nested directory yields an empty subtree, and a
/// file whose link cannot be resolved keeps `download_url: None`. Only a
/// transport failure on the root listing is returned as an error.
pub struct FolderCollector<'a> {
    api: &'a dyn ShareApi,
    session: &'a ShareSession,
    max_depth: u32,
    // Held only across a single upstream call, never while awaiting children.
    limiter: Semaphore,
}

impl<'a> FolderCollector<'a> {
    pub fn new(api: &'a dyn ShareApi, session: &'a ShareSession, max_depth: u32) -> Self {
        Self::with_concurrency(api, session, max_depth, DEFAULT_MAX_CONCURRENCY)
    }

    pub fn with_concurrency(
        api: &'a dyn ShareApi,
        session: &'a ShareSession,
        max_depth: u32,
        max_concurrency: usize,
    ) -> Self {
        Self {
            api,
            session,
            max_depth,
            limiter: Semaphore::new(max_concurrency.max(1)),
        }
    }

    /// Collect every file under `dir`.
    pub async fn collect(&self, dir: &str) -> Result<Vec<FileRecord>> {
        self.collect_dir(dir.to_string(), 0).await
    }

    fn collect_dir(&self, dir: String, depth: u32) -> BoxFuture<'_, Result<Vec<FileRecord>>> {
        async move {
            if depth > self.max_depth {
                return Ok(Vec::new());
            }

            let listing = match self.list(&dir).await {
                Ok(listing) => listing,
                Err(e) if depth > 0 => {
                    warn!("Skipping {} after listing failure: {}", dir, e);
                    return Ok(Vec::new());
                }
                Err(e) => return Err(e),
            };

            if !listing.is_ok() {
                warn!(
                    "Skipping {}: errno {} ({})",
                    dir,
                    listing.errno,
                    listing.errmsg.as_deref().unwrap_or("no message")
                );
                return Ok(Vec::new());
            }

            let (dirs, files): (Vec<ShareEntry>, Vec<ShareEntry>) =
                listing.list.into_iter().partition(ShareEntry::is_dir);
            debug!(
                "{} at depth {}: {} file(s), {} folder(s)",
                dir,
                depth,
                files.len(),
                dirs.len()
            );

            let mut records = Vec::with_capacity(files.len());
            for entry in &files {
                let download_url = self.download_link(&entry.fs_id).await;
                records.push(FileRecord::new(entry, download_url));
            }

            let subtrees = join_all(
                dirs.into_iter()
                    .map(|entry| self.collect_dir(entry.path, depth + 1)),
            )
            .await;

            for subtree in subtrees {
                records.extend(subtree?);
            }

            Ok(records)
        }
        .boxed()
    }

    async fn list(&self, dir: &str) -> Result<ShareListResponse> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|e| RelayError::Internal(e.to_string()))?;
        self.api.fetch_share_info(&self.session.surl, dir).await
    }

    async fn download_link(&self, fs_id: &str) -> Option<String> {
        let _permit = self.limiter.acquire().await.ok()?;
        self.api
            .fetch_download_link(&self.session.credentials, fs_id)
            .await
    }
}
