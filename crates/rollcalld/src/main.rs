use anyhow::Result;
use rollcall_store::SqliteStore;
use rollcalld::config::Config;
use rollcalld::recorder::AttendanceRecorder;
use rollcalld::room::RoomConfig;
use rollcalld::scheduler::SessionInitializer;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    tracing::info!(db = %config.db_path.display(), "rollcalld starting");

    let store = Arc::new(SqliteStore::open(&config.db_path)?);
    let rooms = Arc::new(RoomConfig::load(store.clone())?);
    match rooms.current() {
        Some(room) => tracing::info!(room = %room, "room configured"),
        None => tracing::warn!("no room configured; seeding is idle until one is set"),
    }

    let recorder = Arc::new(AttendanceRecorder::new(store.clone(), config.policy.clone()));
    let initializer = SessionInitializer::new(store, recorder, rooms, config.policy);

    let (stop_tx, stop_rx) = watch::channel(false);
    let scheduler = tokio::spawn(initializer.run(stop_rx));

    tracing::info!("rollcalld ready");
    tokio::signal::ctrl_c().await?;
    tracing::info!("rollcalld shutting down");

    let _ = stop_tx.send(true);
    scheduler.await?;
    Ok(())
}
