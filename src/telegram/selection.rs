//! Pending quality selections, keyed by requesting user.
//!
//! A shown quality menu stores the resolved URL here until the user picks
//! a button. Entries are single-use (`take` removes atomically under the
//! map lock) and expire after a TTL so abandoned menus do not pile up.
//! A newer link from the same user overwrites the older entry: last
//! request wins, one pending menu per user.

use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

struct PendingEntry {
    url: String,
    stored_at: Instant,
}

/// TTL map from user id to the URL their quality menu was built for
pub struct SelectionStore {
    entries: Mutex<HashMap<u64, PendingEntry>>,
    ttl: Duration,
}

impl SelectionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Stores (or replaces) the pending URL for a user
    pub async fn insert(&self, user_id: u64, url: String) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            user_id,
            PendingEntry {
                url,
                stored_at: Instant::now(),
            },
        );
    }

    /// Removes and returns the pending URL for a user.
    ///
    /// Expired entries are dropped and reported as absent. Remove-on-read
    /// makes each menu single-use and leaves concurrent clicks with at
    /// most one winner.
    pub async fn take(&self, user_id: u64) -> Option<String> {
        let mut entries = self.entries.lock().await;
        let entry = entries.remove(&user_id)?;
        if entry.stored_at.elapsed() < self.ttl {
            Some(entry.url)
        } else {
            None
        }
    }

    /// Drops all expired entries. Run periodically from a background task.
    pub async fn cleanup(&self) {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        let removed = before - entries.len();
        if removed > 0 {
            log::debug!("Swept {} expired pending selection(s)", removed);
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
