use axum::{
    Json, debug_handler,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;

use crate::{AppError, AppResult, chat::Chat, session::User};

use super::Message;

#[derive(Debug, Deserialize)]
pub(crate) struct RecentQuery {
    limit: Option<String>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn recent(
    State(chat): State<Chat>,
    User(viewer): User,
    query: Result<Query<RecentQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Message>>> {
    let Query(RecentQuery { limit }) = query?;
    let limit = limit.as_deref().map(parse_limit).transpose()?;

    Ok(Json(chat.recent(&viewer, limit).await?))
}

fn parse_limit(raw: &str) -> AppResult<usize> {
    match raw.trim().parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(AppError::Validation(format!(
            "limit must be a positive integer, got {raw:?}"
        ))),
    }
}
