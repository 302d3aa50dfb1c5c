use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt, SeekFrom};
use tokio::sync::RwLock;
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use super::{AudioContent, AudioMeta, AudioStore, ByteRange, Clock, StoreResult, StoredMeta};

/// Filesystem backend: one payload file per token under the upload dir,
/// metadata in an in-process index.
///
/// A put writes to a temp file and renames it into place before the index
/// entry appears, so no reader ever sees a half-written payload. The index
/// is the source of truth for liveness; a token missing from it is absent
/// no matter what is on disk.
pub struct DiskStore {
    root: PathBuf,
    temp_dir: PathBuf,
    index: RwLock<HashMap<String, StoredMeta>>,
    clock: Arc<dyn Clock>,
}

impl DiskStore {
    /// Open the backend, clearing any payload files left by a previous
    /// process. Entries do not survive a restart.
    pub async fn open(root: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> StoreResult<Self> {
        let root = root.into();
        let temp_dir = root.join("temp");

        fs::create_dir_all(&root).await?;
        clear_directory(&root).await;
        fs::create_dir_all(&temp_dir).await?;
        clear_directory(&temp_dir).await;

        Ok(Self {
            root,
            temp_dir,
            index: RwLock::new(HashMap::new()),
            clock,
        })
    }

    fn payload_path(&self, token: &str) -> PathBuf {
        self.root.join(token)
    }

    fn temp_path(&self) -> PathBuf {
        self.temp_dir.join(format!("put_{}", uuid::Uuid::new_v4()))
    }

    async fn write_payload(&self, path: &Path, payload: &[u8]) -> std::io::Result<()> {
        let mut file = File::create(path).await?;
        file.write_all(payload).await?;
        file.sync_all().await?;
        Ok(())
    }
}

/// Remove regular files directly under `dir`, leaving subdirectories alone
async fn clear_directory(dir: &Path) {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(_) => return,
    };
    let mut removed = 0usize;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if path.is_file() && fs::remove_file(&path).await.is_ok() {
            removed += 1;
        }
    }
    if removed > 0 {
        info!("cleared {} stale payload file(s) from {}", removed, dir.display());
    }
}

#[async_trait]
impl AudioStore for DiskStore {
    async fn put(&self, token: &str, payload: Bytes, meta: AudioMeta) -> StoreResult<()> {
        let temp_path = self.temp_path();
        if let Err(e) = self.write_payload(&temp_path, &payload).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        let final_path = self.payload_path(token);
        if let Err(e) = fs::rename(&temp_path, &final_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        self.index.write().await.insert(
            token.to_string(),
            StoredMeta {
                size: payload.len() as u64,
                content_type: meta.content_type,
                filename: meta.filename,
                created_at: self.clock.now(),
            },
        );
        Ok(())
    }

    async fn head(&self, token: &str) -> Option<StoredMeta> {
        self.index.read().await.get(token).cloned()
    }

    async fn get(&self, token: &str, range: Option<ByteRange>) -> Option<AudioContent> {
        let meta = self.index.read().await.get(token).cloned()?;

        let mut file = match File::open(self.payload_path(token)).await {
            Ok(file) => file,
            Err(e) => {
                // A payload missing under a live index entry means the file
                // was yanked out from under us; report absence like any
                // other read-path fault.
                warn!("failed to open payload for {}: {}", token, e);
                return None;
            }
        };

        let stream: super::ByteStream = match range {
            Some(r) => {
                if let Err(e) = file.seek(SeekFrom::Start(r.start)).await {
                    warn!("failed to seek payload for {}: {}", token, e);
                    return None;
                }
                Box::pin(ReaderStream::new(file.take(r.len())))
            }
            None => Box::pin(ReaderStream::new(file)),
        };

        Some(AudioContent {
            stream,
            total_size: meta.size,
            content_type: meta.content_type,
        })
    }

    async fn delete(&self, token: &str) {
        let removed = self.index.write().await.remove(token);
        if removed.is_none() {
            return;
        }

        // The entry is already invisible; a failed unlink only leaks disk
        // space until the next restart wipe.
        match fs::remove_file(self.payload_path(token)).await {
            Ok(()) => info!("deleted audio entry {}", token),
            Err(e) => warn!("failed to unlink payload for {}: {}", token, e),
        }
    }

    async fn sweep_expired(&self, ttl: Duration) -> usize {
        let cutoff = self.clock.now();
        let expired: Vec<String> = {
            let mut index = self.index.write().await;
            let victims: Vec<String> = index
                .iter()
                .filter(|(_, m)| {
                    m.created_at
                        .checked_add(ttl)
                        .map(|deadline| deadline <= cutoff)
                        .unwrap_or(false)
                })
                .map(|(token, _)| token.clone())
                .collect();
            for token in &victims {
                index.remove(token);
            }
            victims
        };

        for token in &expired {
            if let Err(e) = fs::remove_file(self.payload_path(token)).await {
                warn!("failed to unlink expired payload for {}: {}", token, e);
            }
        }
        expired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ManualClock, SystemClock};
    use futures_util::StreamExt;
    use std::time::SystemTime;

    fn meta() -> AudioMeta {
        AudioMeta {
            content_type: "audio/mpeg".to_string(),
            filename: "take.mp3".to_string(),
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
    async fn roundtrip_with_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::open(dir.path(), Arc::new(SystemClock))
            .await
            .unwrap();

        store
            .put("t1", Bytes::from_static(b"abcdefghij"), meta())
            .await
            .unwrap();

        let head = store.head("t1").await.unwrap();
        assert_eq!(head.size, 10);

        let full = store.get("t1", None).await.unwrap();
        assert_eq!(collect(full).await, b"abcdefghij");

        let slice = store
            .get("t1", Some(ByteRange { start: 3, end: 7 }))
            .await
            .unwrap();
        assert_eq!(slice.total_size, 10);
        assert_eq!(collect(slice).await, b"defgh");
    }

    #[tokio::test]
    async fn delete_removes_entry_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::open(dir.path(), Arc::new(SystemClock))
            .await
            .unwrap();

        store.put("t1", Bytes::from_static(b"x"), meta()).await.unwrap();
        let path = store.payload_path("t1");
        assert!(path.exists());

        store.delete("t1").await;
        assert!(store.head("t1").await.is_none());
        assert!(!path.exists());

        // repeat delete of an absent entry is a no-op
        store.delete("t1").await;
    }

    #[tokio::test]
    async fn sweep_unlinks_expired_payloads() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(SystemTime::UNIX_EPOCH));
        let store = DiskStore::open(dir.path(), clock.clone()).await.unwrap();

        store.put("t1", Bytes::from_static(b"x"), meta()).await.unwrap();
        clock.advance(Duration::from_secs(120));

        assert_eq!(store.sweep_expired(Duration::from_secs(60)).await, 1);
        assert!(store.head("t1").await.is_none());
        assert!(!store.payload_path("t1").exists());
    }

    #[tokio::test]
    async fn open_wipes_leftovers_from_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = DiskStore::open(dir.path(), Arc::new(SystemClock))
                .await
                .unwrap();
            store.put("t1", Bytes::from_static(b"x"), meta()).await.unwrap();
        }

        let store = DiskStore::open(dir.path(), Arc::new(SystemClock))
            .await
            .unwrap();
        assert!(store.head("t1").await.is_none());
        assert!(!store.payload_path("t1").exists());
    }
}
