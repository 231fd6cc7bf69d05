use axum::{debug_handler, extract::State, http::StatusCode};

use crate::{AppResult, chat::Chat, session::User};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn heartbeat(State(chat): State<Chat>, User(name): User) -> AppResult<StatusCode> {
    chat.heartbeat(&name).await?;
    Ok(StatusCode::OK)
}
