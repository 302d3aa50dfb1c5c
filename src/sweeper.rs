use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::store::AudioStore;

/// Spawn the background expiry job.
///
/// Runs on its own interval, never on a request path. Requests racing a
/// sweep of the same token resolve through the store's own atomicity.
pub fn start_sweeper(store: Arc<dyn AudioStore>, ttl: Duration, sweep_interval: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        loop {
            interval.tick().await;
            let evicted = store.sweep_expired(ttl).await;
            if evicted > 0 {
                info!("expiry sweep evicted {} entries", evicted);
            }
        }
    });
}
