use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::store::AudioStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AudioStore>,
    pub max_upload_bytes: u64,
    pub ttl: Duration,
    pub sweep_interval: Duration,
    pub bind_addr: String,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub token: String,
}

#[derive(Serialize)]
pub struct CheckResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
}
