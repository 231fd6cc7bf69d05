use axum::{
    Json, debug_handler,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{AppResult, chat::Chat, session::User};

use super::MessageFields;

#[debug_handler(state = crate::AppState)]
pub(crate) async fn send_msg(
    State(chat): State<Chat>,
    User(from): User,
    body: Result<Json<MessageFields>, JsonRejection>,
) -> AppResult<StatusCode> {
    let Json(fields) = body?;
    chat.post(&from, fields).await?;

    Ok(StatusCode::CREATED)
}
