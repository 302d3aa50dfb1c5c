use std::time::Duration;

// Upload limits
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 50 * 1024 * 1024; // 50MB
pub const LOG_INTERVAL: Duration = Duration::from_secs(5);

// Entry lifecycle
pub const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

// HTTP header names
pub const X_FILE_NAME_HEADER: &str = "x-file-name";

// Default values
pub const DEFAULT_AUDIO_CONTENT_TYPE: &str = "audio/mpeg";
pub const DEFAULT_FILENAME: &str = "untitled audio";

// Cache control
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

// User-facing messages
pub const GONE_MESSAGE: &str = "this audio is no longer available";
