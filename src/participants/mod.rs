mod list;
mod new;

use axum::{
    Router,
    routing::{delete, get},
};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult, AppState};

/// Presence record for one display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub name: String,
    /// Milliseconds since the Unix epoch of the last registration or heartbeat.
    #[serde(rename = "lastStatus")]
    pub last_seen: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterBody {
    pub name: Option<String>,
}

/// Trims and checks a display name.
pub fn validate_name(name: Option<&str>) -> AppResult<String> {
    let name = name
        .map(str::trim)
        .ok_or_else(|| AppError::Validation("name is required".to_owned()))?;
    if name.is_empty() {
        return Err(AppError::Validation("name must not be empty".to_owned()));
    }

    Ok(name.to_owned())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/participants", get(list::list).post(new::register))
        .route("/participants/{name}", delete(list::remove))
}
