use axum::{
    Json, debug_handler,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{AppError, AppResult, chat::Chat, session::User};

use super::MessageFields;

#[debug_handler(state = crate::AppState)]
pub(crate) async fn edit_msg(
    State(chat): State<Chat>,
    User(requester): User,
    Path(id): Path<String>,
    body: Result<Json<MessageFields>, JsonRejection>,
) -> AppResult<StatusCode> {
    let Json(fields) = body?;
    chat.edit_owned(message_id(&id)?, &requester, fields).await?;

    Ok(StatusCode::CREATED)
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete_msg(
    State(chat): State<Chat>,
    User(requester): User,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    chat.delete_owned(message_id(&id)?, &requester).await?;
    Ok(StatusCode::OK)
}

/// Ids that cannot name a stored message are simply not found.
fn message_id(raw: &str) -> AppResult<i64> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("no message with id {raw:?}")))
}
