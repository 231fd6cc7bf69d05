use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{AppResult, chat::Chat};

use super::Participant;

#[debug_handler(state = crate::AppState)]
pub(crate) async fn list(State(chat): State<Chat>) -> AppResult<Json<Vec<Participant>>> {
    Ok(Json(chat.list().await?))
}

/// Administrative cleanup. Removing an absent name is not an error.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn remove(
    State(chat): State<Chat>,
    Path(name): Path<String>,
) -> AppResult<StatusCode> {
    chat.remove(&name).await?;
    Ok(StatusCode::OK)
}
