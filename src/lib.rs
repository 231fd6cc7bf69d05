pub mod appresult;
pub mod chat;
pub mod clock;
pub mod config;
pub mod messages;
pub mod participants;
pub mod presence;
pub mod session;
pub mod store;

use axum::{Router, extract::FromRef, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use appresult::{AppError, AppResult};
use chat::Chat;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub chat: Chat,
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))

        .merge(participants::router())
        .merge(messages::router())
        .merge(presence::router())

        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "OK"
}
