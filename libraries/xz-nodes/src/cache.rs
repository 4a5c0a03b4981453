//! Request-scoped cache of browser-captured workflows

use lru::LruCache;
use serde_json::Value;
use std::num::NonZeroUsize;
use tokio::sync::Mutex;
use tracing::debug;
use xz_core::SessionId;

/// Fallback capacity when zero is requested
const MIN_CAPACITY: NonZeroUsize = NonZeroUsize::MIN;

/// Workflow JSON keyed by session, bounded and evicted least-recently-used
///
/// The host stores the editor's workflow when a session starts and ends the
/// session when execution finishes; entries from abandoned sessions fall out
/// once capacity is reached.
#[derive(Debug)]
pub struct WorkflowCache {
    entries: Mutex<LruCache<SessionId, Value>>,
}

impl WorkflowCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(MIN_CAPACITY);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn store(&self, session: SessionId, workflow: Value) {
        let mut entries = self.entries.lock().await;
        if let Some((evicted, _)) = entries.push(session.clone(), workflow) {
            if evicted != session {
                debug!(session = %evicted, "Evicted cached workflow");
            }
        }
    }

    pub async fn get(&self, session: &SessionId) -> Option<Value> {
        self.entries.lock().await.get(session).cloned()
    }

    /// Drop the session's entry, returning it
    pub async fn end_session(&self, session: &SessionId) -> Option<Value> {
        self.entries.lock().await.pop(session)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn store_get_and_end() {
        let cache = WorkflowCache::new(4);
        let session = SessionId::new("a");

        cache.store(session.clone(), json!({"nodes": [1]})).await;
        assert_eq!(cache.get(&session).await, Some(json!({"nodes": [1]})));

        assert!(cache.end_session(&session).await.is_some());
        assert_eq!(cache.get(&session).await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn least_recently_used_is_evicted() {
        let cache = WorkflowCache::new(2);
        let (a, b, c) = (SessionId::new("a"), SessionId::new("b"), SessionId::new("c"));

        cache.store(a.clone(), json!(1)).await;
        cache.store(b.clone(), json!(2)).await;
        // Touch a so b becomes the oldest
        cache.get(&a).await;
        cache.store(c.clone(), json!(3)).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get(&a).await.is_some());
        assert!(cache.get(&b).await.is_none());
        assert!(cache.get(&c).await.is_some());
    }

    #[tokio::test]
    async fn storing_again_replaces() {
        let cache = WorkflowCache::new(2);
        let a = SessionId::new("a");

        cache.store(a.clone(), json!(1)).await;
        cache.store(a.clone(), json!(2)).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&a).await, Some(json!(2)));
    }

    #[test]
    fn zero_capacity_falls_back_to_one() {
        let cache = WorkflowCache::new(0);
        assert_eq!(cache.entries.try_lock().unwrap().cap().get(), 1);
    }
}
