//! Schedule store with TTL caching
//!
//! The store keeps the most recently loaded schedule snapshot in memory and
//! only touches the file again once the snapshot is older than the TTL.
//! Readers always get a fully-formed `Arc` snapshot: a refresh swaps the
//! whole document, never mutates it in place.
//!
//! Load failures are absorbed here and never surface to callers: a corrupt or
//! missing file yields the previous snapshot (or an empty document on first
//! load), the same graceful degradation the rest of the system relies on.

use crate::error::Result;
use crate::models::ScheduleDocument;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Default time-to-live for a cached schedule snapshot
pub const DEFAULT_SCHEDULE_TTL: Duration = Duration::from_secs(5);

/// Source of schedule snapshots.
///
/// The trait is the seam that lets tests substitute a fixed document for the
/// file-backed store.
#[async_trait]
pub trait ScheduleProvider: Send + Sync {
    /// Best-effort read of the current schedule. Never fails; the worst case
    /// is an empty document.
    async fn get(&self) -> Arc<ScheduleDocument>;
}

/// File-backed schedule store with a short TTL cache
pub struct FileScheduleStore {
    path: PathBuf,
    ttl: Duration,
    state: RwLock<CacheState>,
}

struct CacheState {
    document: Arc<ScheduleDocument>,
    loaded_at: Option<Instant>,
}

impl FileScheduleStore {
    /// Create a store reading from `path` with the default TTL
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_ttl(path, DEFAULT_SCHEDULE_TTL)
    }

    /// Create a store reading from `path` with a custom TTL
    pub fn with_ttl(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
            state: RwLock::new(CacheState {
                document: Arc::new(ScheduleDocument::default()),
                loaded_at: None,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_document(&self) -> Result<ScheduleDocument> {
        let raw = tokio::fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

#[async_trait]
impl ScheduleProvider for FileScheduleStore {
    async fn get(&self) -> Arc<ScheduleDocument> {
        {
            let state = self.state.read().await;
            if let Some(loaded_at) = state.loaded_at {
                if loaded_at.elapsed() < self.ttl {
                    return state.document.clone();
                }
            }
        }

        let mut state = self.state.write().await;

        // Another task may have refreshed while we waited for the write lock.
        if let Some(loaded_at) = state.loaded_at {
            if loaded_at.elapsed() < self.ttl {
                return state.document.clone();
            }
        }

        match self.load_document().await {
            Ok(document) => {
                debug!(
                    "Schedule refreshed from {}: {} channel(s)",
                    self.path.display(),
                    document.total_channels()
                );
                state.document = Arc::new(document);
            }
            Err(e) => {
                warn!(
                    "Failed to load schedule from {}, serving previous snapshot: {}",
                    self.path.display(),
                    e
                );
            }
        }

        // Stamp even on failure so a broken file is retried once per TTL,
        // not once per request.
        state.loaded_at = Some(Instant::now());
        state.document.clone()
    }
}

/// Fixed-document provider, mainly for tests and embedded setups
pub struct StaticSchedule(Arc<ScheduleDocument>);

impl StaticSchedule {
    pub fn new(document: ScheduleDocument) -> Self {
        Self(Arc::new(document))
    }
}

#[async_trait]
impl ScheduleProvider for StaticSchedule {
    async fn get(&self) -> Arc<ScheduleDocument> {
        self.0.clone()
    }
}
