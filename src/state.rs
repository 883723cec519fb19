//! Shared application state: the current feed snapshot and the client used
//! to rebuild it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::aggregate::{self, FeedView};
use crate::upstream::{self, UpstreamError};
use crate::Config;

// ---

/// One fully normalized feed fetch.
#[derive(Debug)]
pub struct FeedSnapshot {
    pub view: FeedView,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub client: Client,
    snapshot: Arc<RwLock<Option<Arc<FeedSnapshot>>>>,
    refreshing: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        // ---
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            config,
            client,
            snapshot: Arc::new(RwLock::new(None)),
            refreshing: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Current snapshot, if any feed was ever loaded.
    pub async fn snapshot(&self) -> Option<Arc<FeedSnapshot>> {
        self.snapshot.read().await.clone()
    }

    /// Fetch and normalize the feed, replacing the snapshot only on success.
    pub async fn reload(&self, cache_bust: bool) -> Result<Arc<FeedSnapshot>, UpstreamError> {
        // ---
        let feed = match upstream::fetch_feed(&self.client, &self.config.feed_url, cache_bust).await {
            Ok(feed) => feed,
            Err(e) => {
                error!("Failed to fetch incident feed: {}", e);
                return Err(e);
            }
        };

        let snapshot = Arc::new(FeedSnapshot {
            view: aggregate::aggregate(&feed, self.config.table_window),
            fetched_at: Utc::now(),
        });
        info!(
            "Feed normalized: {} incidents, {} in window, {} ongoing",
            snapshot.view.incidents.len(),
            snapshot.view.table.len(),
            snapshot.view.ongoing.len()
        );

        *self.snapshot.write().await = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Trigger the upstream recompute (when `recompute`), then reload with a
    /// cache-busted fetch. Any failure leaves the current snapshot in place.
    pub async fn refresh(&self, recompute: bool) -> Result<Arc<FeedSnapshot>, UpstreamError> {
        // ---
        if recompute {
            let url = self
                .config
                .refresh_url
                .as_deref()
                .ok_or(UpstreamError::NotConfigured("REFRESH_URL"))?;
            if let Err(e) = upstream::trigger_refresh(&self.client, url).await {
                error!("Upstream recompute failed: {}", e);
                return Err(e);
            }
        }
        self.reload(true).await
    }

    /// Advisory busy flag. Returns `None` if a refresh is already running.
    ///
    /// The flag clears when the guard drops, including when the request
    /// future is cancelled mid-refresh.
    pub fn begin_refresh(&self) -> Option<RefreshGuard> {
        self.refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshGuard {
                flag: self.refreshing.clone(),
            })
    }
}

/// Holds the busy flag for the lifetime of one refresh.
pub struct RefreshGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
