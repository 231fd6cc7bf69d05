use std::sync::Arc;

use batepapo::{
    AppState, chat::Chat, clock::SystemClock, config::Config, presence::Sweeper,
    store::SqliteStore,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("batepapo=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let store = SqliteStore::connect(&config.database_url, config.max_connections).await?;
    let chat = Chat::new(Arc::new(store), Arc::new(SystemClock));

    Sweeper::new(chat.clone(), config.stale_after, config.sweep_interval).spawn();

    let app = batepapo::router(AppState { chat });
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
