//! Image store: persisted studio captures keyed by user.
//!
//! SYSTEM CONTEXT
//! ==============
//! The hosted product writes the image to object storage and a metadata row
//! to a document store. [`ImageStore`] is that collaborator; the in-memory
//! implementation backs the CLI session and tests.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::datauri;

pub const KIND_CAPTURED: &str = "captured";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("empty image")]
    EmptyImage,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRecord {
    pub id: Uuid,
    pub user_id: String,
    pub image_url: String,
    pub kind: String,
    /// Milliseconds since Unix epoch.
    pub created_at_ms: i64,
    pub operations: Vec<String>,
}

#[async_trait::async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist `image` for `user_id` and return its metadata record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the image is empty or the backend fails.
    async fn save_image(&self, user_id: &str, image: &[u8], mime: &str, kind: &str)
    -> Result<ImageRecord, StoreError>;

    /// Up to `limit` records for `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the backend fails.
    async fn recent_images(&self, user_id: &str, limit: usize) -> Result<Vec<ImageRecord>, StoreError>;
}

#[derive(Default)]
pub struct InMemoryImageStore {
    records: RwLock<Vec<ImageRecord>>,
}

impl InMemoryImageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn insert(&self, record: ImageRecord) {
        self.records.write().await.push(record);
    }
}

#[async_trait::async_trait]
impl ImageStore for InMemoryImageStore {
    async fn save_image(
        &self,
        user_id: &str,
        image: &[u8],
        mime: &str,
        kind: &str,
    ) -> Result<ImageRecord, StoreError> {
        if image.is_empty() {
            return Err(StoreError::EmptyImage);
        }
        let record = ImageRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            image_url: datauri::encode(mime, image),
            kind: kind.to_string(),
            created_at_ms: now_ms(),
            operations: Vec::new(),
        };
        info!(id = %record.id, %user_id, bytes = image.len(), "storage: image saved");
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn recent_images(&self, user_id: &str, limit: usize) -> Result<Vec<ImageRecord>, StoreError> {
        let records = self.records.read().await;
        // Reverse insertion order first so equal timestamps keep newest-first.
        let mut mine: Vec<ImageRecord> = records
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
        mine.truncate(limit);
        Ok(mine)
    }
}

pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
