mod edit;
mod list;
mod msg;
mod send;
pub mod visibility;

use axum::{
    Router,
    routing::{get, put},
};

use crate::AppState;

pub use msg::{
    BROADCAST_TARGET, Draft, JOIN_NOTICE, LEAVE_NOTICE, Message, MessageFields, MessageKind,
    NewMessage,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages", get(list::recent).post(send::send_msg))
        .route("/messages/{id}", put(edit::edit_msg).delete(edit::delete_msg))
}
