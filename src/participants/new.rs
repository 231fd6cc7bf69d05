use axum::{
    Json, debug_handler,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{AppResult, chat::Chat};

use super::RegisterBody;

#[debug_handler(state = crate::AppState)]
pub(crate) async fn register(
    State(chat): State<Chat>,
    body: Result<Json<RegisterBody>, JsonRejection>,
) -> AppResult<StatusCode> {
    let Json(RegisterBody { name }) = body?;
    chat.register(name.as_deref()).await?;

    Ok(StatusCode::CREATED)
}
