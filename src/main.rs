use chrono::Local;
use std::net::SocketAddr;
use study_sheet::{AppState, Config, Store, coach::CoachClient, router};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if config.coach.api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; coach comments will report an error");
    }

    let store = Store::new(&config.data_dir);
    store.ensure_dir().await?;

    let data = store.load_data(Local::now().date_naive()).await;
    if let Err(err) = store.persist_data(&data).await {
        error!("failed to persist sheet: {err}");
    }
    let sidebar_open = store.load_sidebar().await;

    let coach = CoachClient::new(config.coach.clone())?;
    let state = AppState::new(store, data, sidebar_open, coach);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        return;
    }
    info!("shutting down");
}
