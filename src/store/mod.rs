pub mod disk;
pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;
use futures_core::Stream;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};
use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Streamed payload bytes produced by a store backend
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send + 'static>>;

/// Errors that can occur while committing an entry to a backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Inclusive byte range, already validated against the entry's total size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered; ranges are inclusive so this is never zero.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Caller-supplied metadata committed alongside a payload
#[derive(Debug, Clone)]
pub struct AudioMeta {
    pub content_type: String,
    pub filename: String,
}

/// Metadata of a live entry, returned without transferring payload bytes
#[derive(Debug, Clone)]
pub struct StoredMeta {
    pub size: u64,
    pub content_type: String,
    pub filename: String,
    pub created_at: SystemTime,
}

/// Payload (full or sliced) handed to the stream responder
pub struct AudioContent {
    pub stream: ByteStream,
    pub total_size: u64,
    pub content_type: String,
}

/// Storage capability shared by all backends.
///
/// An entry is either live or absent; callers never observe a partially
/// written or partially deleted state. Read-path backend faults degrade to
/// absence and `delete` always succeeds, matching what the HTTP surface
/// promises.
#[async_trait]
pub trait AudioStore: Send + Sync {
    /// Store payload and metadata atomically under a fresh token.
    ///
    /// A failed put must leave no visible entry. Overwrites are not expected
    /// (tokens are never reused) but are last-write-wins if they happen.
    async fn put(&self, token: &str, payload: Bytes, meta: AudioMeta) -> StoreResult<()>;

    /// Metadata of a live entry, or `None` when absent. Never counts as an
    /// access for any lifetime-extending purpose.
    async fn head(&self, token: &str) -> Option<StoredMeta>;

    /// Full payload, or the exact inclusive slice when a range is given.
    async fn get(&self, token: &str, range: Option<ByteRange>) -> Option<AudioContent>;

    /// Remove an entry. Absence is success; backend faults are swallowed.
    async fn delete(&self, token: &str);

    /// Evict every entry older than `ttl`, returning how many were removed.
    async fn sweep_expired(&self, ttl: Duration) -> usize;
}

/// Time source injected into store backends so TTL behavior is
/// deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// Wall-clock time, used in production
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Hand-driven clock for tests; `advance` moves time forward explicitly.
pub struct ManualClock {
    now: Mutex<SystemTime>,
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().unwrap()
    }
}
