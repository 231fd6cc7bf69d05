mod status;
mod sweeper;

use axum::{Router, routing::post};

use crate::AppState;

pub use sweeper::Sweeper;

pub fn router() -> Router<AppState> {
    Router::new().route("/status", post(status::heartbeat))
}
