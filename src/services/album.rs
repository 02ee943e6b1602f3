//! Media-group batching
//!
//! Telegram delivers an album as separate messages sharing a
//! `media_group_id`. The collector buffers them so all attachments of one
//! submission land in exactly one ticket: the first message of a group
//! becomes the owner, waits out a short grace window, then flushes the
//! whole batch. Followers just add to the buffer and return immediately.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// How long the owner waits for trailing album items.
pub const ALBUM_GRACE: Duration = Duration::from_millis(1500);

#[derive(Clone)]
pub struct AlbumCollector<T> {
    grace: Duration,
    pending: Arc<Mutex<HashMap<String, Vec<T>>>>,
}

impl<T> AlbumCollector<T> {
    pub fn new() -> Self {
        Self::with_grace(ALBUM_GRACE)
    }

    pub fn with_grace(grace: Duration) -> Self {
        Self {
            grace,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Add one item to a group. Returns the full batch to exactly one
    /// caller per group (the first one); all others get None.
    pub async fn collect(&self, group_id: &str, item: T) -> Option<Vec<T>> {
        let is_owner = {
            let mut pending = self.pending.lock().await;
            match pending.get_mut(group_id) {
                Some(batch) => {
                    batch.push(item);
                    false
                }
                None => {
                    pending.insert(group_id.to_string(), vec![item]);
                    true
                }
            }
        };

        if !is_owner {
            return None;
        }

        tokio::time::sleep(self.grace).await;

        let mut pending = self.pending.lock().await;
        pending.remove(group_id)
    }
}

impl<T> Default for AlbumCollector<T> {
    fn default() -> Self {
        Self::new()
    }
}
