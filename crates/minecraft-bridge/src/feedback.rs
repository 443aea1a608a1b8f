//! Feedback recording
//!
//! Successfully parsed ratings become append-only records in the
//! feedback store, and the originating channel gets a star-decorated
//! acknowledgement.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use minecraft_types::{FeedbackKind, FeedbackRecord, FeedbackSource};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Correction shown when the rating is outside 1..=5
pub const RATING_CORRECTION: &str = "Rating must be 1-5 stars!";

/// Append-only feedback storage.
pub trait FeedbackStore: Send + Sync {
    fn append(&self, record: FeedbackRecord) -> impl Future<Output = Result<()>> + Send;
}

/// In-process store; records live until the process exits
#[derive(Clone, Default)]
pub struct MemoryFeedbackStore {
    records: Arc<RwLock<Vec<FeedbackRecord>>>,
}

impl MemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<FeedbackRecord> {
        self.records.read().await.clone()
    }
}

impl FeedbackStore for MemoryFeedbackStore {
    async fn append(&self, record: FeedbackRecord) -> Result<()> {
        self.records.write().await.push(record);
        Ok(())
    }
}

pub struct FeedbackRecorder<S: FeedbackStore> {
    store: S,
}

impl<S: FeedbackStore> FeedbackRecorder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Append a record and return the acknowledgement chat line.
    ///
    /// Store failures are logged, not surfaced: the user still gets
    /// their acknowledgement.
    pub async fn record(&self, username: &str, rating: u8, kind: FeedbackKind) -> String {
        let record = FeedbackRecord::new(username, rating, kind, FeedbackSource::Minecraft);
        if let Err(e) = self.store.append(record).await {
            warn!("Failed to append feedback from {}: {}", username, e);
        } else {
            info!(
                "Feedback from {}: {}/5 stars, type: {}",
                username,
                rating,
                kind.as_str()
            );
        }

        let stars = "⭐".repeat(rating as usize);
        format!("Thanks {}! Feedback: {} {}", username, stars, kind.as_str())
    }
}
