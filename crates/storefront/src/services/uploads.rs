//! In-memory holding area for artwork.
//!
//! An image is accepted into the designer long before it is sent to the
//! backend: only an explicit save uploads it. Until then the bytes live here,
//! keyed by a random id that the session's design draft refers to. Entries are
//! weighted by size and expire after an hour without use.

use std::time::Duration;

use axum::body::Bytes;
use base64::{Engine, engine::general_purpose::STANDARD};
use moka::future::Cache;
use teeforge_core::design::ArtworkRef;
use uuid::Uuid;

/// Total bytes of artwork held at once (256 MiB).
const DEFAULT_CAPACITY_BYTES: u64 = 256 * 1024 * 1024;

/// Idle time after which unsaved artwork is dropped.
const IDLE_EXPIRY: Duration = Duration::from_secs(60 * 60);

/// Artwork bytes plus what is needed to upload them later.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl StoredUpload {
    /// `data:` URL for embedding the image in the preview.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.bytes)
        )
    }
}

#[derive(Clone)]
pub struct UploadStore {
    cache: Cache<String, StoredUpload>,
}

impl Default for UploadStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY_BYTES)
    }
}

impl UploadStore {
    #[must_use]
    pub fn new(capacity_bytes: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity_bytes)
            .weigher(|_key: &String, value: &StoredUpload| {
                u32::try_from(value.bytes.len()).unwrap_or(u32::MAX)
            })
            .time_to_idle(IDLE_EXPIRY)
            .build();
        Self { cache }
    }

    /// Keep `upload` and return the reference the draft stores.
    pub async fn insert(&self, upload: StoredUpload) -> ArtworkRef {
        let key = Uuid::new_v4().to_string();
        let artwork = ArtworkRef {
            key: key.clone(),
            file_name: upload.file_name.clone(),
            content_type: upload.content_type.clone(),
            size: upload.bytes.len() as u64,
        };
        self.cache.insert(key, upload).await;
        artwork
    }

    pub async fn get(&self, artwork: &ArtworkRef) -> Option<StoredUpload> {
        self.cache.get(&artwork.key).await
    }

    pub async fn remove(&self, artwork: &ArtworkRef) {
        self.cache.invalidate(&artwork.key).await;
    }
}
