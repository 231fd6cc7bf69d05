use axum::{extract::FromRequestParts, http::request::Parts};

use crate::AppError;

/// Header carrying the caller's display name. Taken at face value.
pub const USER: &str = "user";

/// Identity of the caller, read from the [`USER`] header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User(pub String);

impl<S> FromRequestParts<S> for User
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER)
            .ok_or_else(|| AppError::Validation("missing User header".to_owned()))?;

        // registration accepts any UTF-8 name, so the header must carry one too
        let name = std::str::from_utf8(value.as_bytes())
            .map_err(|_| AppError::Validation("User header must be UTF-8".to_owned()))?
            .trim();
        if name.is_empty() {
            return Err(AppError::Validation("User header is empty".to_owned()));
        }

        Ok(User(name.to_owned()))
    }
}
