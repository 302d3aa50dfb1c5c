use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use dotenv::dotenv;

use soundpost::constants::*;
use soundpost::create_app;
use soundpost::models::AppState;
use soundpost::store::{disk::DiskStore, memory::MemoryStore, AudioStore, Clock, SystemClock};
use soundpost::sweeper::start_sweeper;

async fn load_app_state() -> AppState {
    dotenv().ok();

    let max_upload_bytes = env::var("MAX_UPLOAD_SIZE")
        .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_SIZE.to_string())
        .parse()
        .expect("Invalid value for MAX_UPLOAD_SIZE");

    let ttl_secs: u64 = env::var("AUDIO_TTL_SECS")
        .unwrap_or_else(|_| DEFAULT_TTL_SECS.to_string())
        .parse()
        .expect("Invalid value for AUDIO_TTL_SECS");

    let sweep_interval_secs: u64 = env::var("SWEEP_INTERVAL_SECS")
        .unwrap_or_else(|_| DEFAULT_SWEEP_INTERVAL_SECS.to_string())
        .parse()
        .expect("Invalid value for SWEEP_INTERVAL_SECS");

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let backend = env::var("STORAGE_BACKEND").unwrap_or_else(|_| "disk".to_string());
    let store: Arc<dyn AudioStore> = match backend.as_str() {
        "memory" => Arc::new(MemoryStore::new(clock)),
        _ => {
            let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./audio".to_string());
            Arc::new(
                DiskStore::open(upload_dir, clock)
                    .await
                    .expect("Failed to open upload directory"),
            )
        }
    };

    AppState {
        store,
        max_upload_bytes,
        ttl: Duration::from_secs(ttl_secs),
        sweep_interval: Duration::from_secs(sweep_interval_secs),
        bind_addr,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let state = load_app_state().await;
    let addr = state
        .bind_addr
        .parse::<SocketAddr>()
        .expect("Invalid address format");

    start_sweeper(state.store.clone(), state.ttl, state.sweep_interval);

    let app = create_app(state).await;

    println!("listening on {}", addr);

    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
