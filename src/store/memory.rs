use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{AudioContent, AudioMeta, AudioStore, ByteRange, Clock, StoreResult, StoredMeta};

struct StoredAudio {
    payload: Bytes,
    meta: StoredMeta,
}

/// In-process backend keeping payloads in memory.
///
/// The single `RwLock` gives atomic visibility of put/delete relative to
/// get/head; `Bytes` handles make slices and full reads cheap clones of the
/// same allocation, so a reader racing a delete keeps whatever payload it
/// already resolved.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoredAudio>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }
}

#[async_trait]
impl AudioStore for MemoryStore {
    async fn put(&self, token: &str, payload: Bytes, meta: AudioMeta) -> StoreResult<()> {
        let stored = StoredAudio {
            meta: StoredMeta {
                size: payload.len() as u64,
                content_type: meta.content_type,
                filename: meta.filename,
                created_at: self.clock.now(),
            },
            payload,
        };
        self.entries.write().await.insert(token.to_string(), stored);
        debug!("stored audio entry {}", token);
        Ok(())
    }

    async fn head(&self, token: &str) -> Option<StoredMeta> {
        self.entries.read().await.get(token).map(|e| e.meta.clone())
    }

    async fn get(&self, token: &str, range: Option<ByteRange>) -> Option<AudioContent> {
        let entries = self.entries.read().await;
        let entry = entries.get(token)?;
        let total_size = entry.meta.size;

        let bytes = match range {
            Some(r) => entry.payload.slice(r.start as usize..(r.end as usize + 1)),
            None => entry.payload.clone(),
        };

        let chunks: Vec<std::io::Result<Bytes>> = vec![Ok(bytes)];
        Some(AudioContent {
            stream: Box::pin(stream::iter(chunks)),
            total_size,
            content_type: entry.meta.content_type.clone(),
        })
    }

    async fn delete(&self, token: &str) {
        if self.entries.write().await.remove(token).is_some() {
            info!("deleted audio entry {}", token);
        }
    }

    async fn sweep_expired(&self, ttl: Duration) -> usize {
        let cutoff = self.clock.now();
        let mut entries = self.entries.write().await;
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, e)| {
                e.meta
                    .created_at
                    .checked_add(ttl)
                    .map(|deadline| deadline <= cutoff)
                    .unwrap_or(false)
            })
            .map(|(token, _)| token.clone())
            .collect();

        for token in &expired {
            entries.remove(token);
        }
        expired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ManualClock;
    use futures_util::StreamExt;
    use std::time::SystemTime;

    fn store_with_clock() -> (MemoryStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(SystemTime::UNIX_EPOCH));
        (MemoryStore::new(clock.clone()), clock)
    }

    fn meta(filename: &str) -> AudioMeta {
        AudioMeta {
            content_type: "audio/mpeg".to_string(),
            filename: filename.to_string(),
        }
    }

    async fn collect(content: AudioContent) -> Vec<u8> {
        let mut out = Vec::new();
        let mut stream = content.stream;
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn put_then_head_reports_size_and_metadata() {
        let (store, _) = store_with_clock();
        store
            .put("t1", Bytes::from_static(b"hello"), meta("song.mp3"))
            .await
            .unwrap();

        let head = store.head("t1").await.unwrap();
        assert_eq!(head.size, 5);
        assert_eq!(head.content_type, "audio/mpeg");
        assert_eq!(head.filename, "song.mp3");
    }

    #[tokio::test]
    async fn get_full_and_sliced() {
        let (store, _) = store_with_clock();
        store
            .put("t1", Bytes::from_static(b"0123456789"), meta("a"))
            .await
            .unwrap();

        let full = store.get("t1", None).await.unwrap();
        assert_eq!(full.total_size, 10);
        assert_eq!(collect(full).await, b"0123456789");

        let slice = store
            .get("t1", Some(ByteRange { start: 2, end: 5 }))
            .await
            .unwrap();
        assert_eq!(slice.total_size, 10);
        assert_eq!(collect(slice).await, b"2345");
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (store, _) = store_with_clock();
        store
            .put("t1", Bytes::from_static(b"x"), meta("a"))
            .await
            .unwrap();

        store.delete("t1").await;
        assert!(store.head("t1").await.is_none());
        assert!(store.get("t1", None).await.is_none());

        // second delete of an absent entry is still fine
        store.delete("t1").await;
        store.delete("never-issued").await;
    }

    #[tokio::test]
    async fn sweep_evicts_only_entries_past_ttl() {
        let (store, clock) = store_with_clock();
        store
            .put("old", Bytes::from_static(b"x"), meta("a"))
            .await
            .unwrap();

        clock.advance(Duration::from_secs(30));
        store
            .put("young", Bytes::from_static(b"y"), meta("b"))
            .await
            .unwrap();

        clock.advance(Duration::from_secs(40));

        // "old" is now 70s old, "young" only 40s
        let evicted = store.sweep_expired(Duration::from_secs(60)).await;
        assert_eq!(evicted, 1);
        assert!(store.head("old").await.is_none());
        assert!(store.head("young").await.is_some());

        clock.advance(Duration::from_secs(30));
        assert_eq!(store.sweep_expired(Duration::from_secs(60)).await, 1);
        assert!(store.head("young").await.is_none());
    }

    #[tokio::test]
    async fn concurrent_puts_stay_isolated() {
        let (store, _) = store_with_clock();
        let store = Arc::new(store);

        let a = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .put("token-a", Bytes::from_static(b"aaaa"), meta("a"))
                    .await
            })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(
                async move { store.put("token-b", Bytes::from_static(b"bb"), meta("b")).await },
            )
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        assert_eq!(collect(store.get("token-a", None).await.unwrap()).await, b"aaaa");
        assert_eq!(collect(store.get("token-b", None).await.unwrap()).await, b"bb");
    }
}
