//! Persistence for participants and messages.
//!
//! The chat core only talks to a [`ChatStore`]. Every method is one atomic
//! operation against the backing store: uniqueness of participant names and
//! the select-and-delete of stale participants are enforced here, not by
//! check-then-act in callers.

mod memory;
mod sqlite;

use async_trait::async_trait;

use crate::{
    AppResult,
    messages::{Draft, Message, NewMessage},
    participants::Participant,
};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Inserts unless the name is taken. Returns whether a row was created.
    async fn insert_participant(&self, participant: &Participant) -> AppResult<bool>;

    /// Refreshes `last_seen`. Returns whether the participant exists.
    async fn touch_participant(&self, name: &str, last_seen: i64) -> AppResult<bool>;

    async fn find_participant(&self, name: &str) -> AppResult<Option<Participant>>;

    async fn list_participants(&self) -> AppResult<Vec<Participant>>;

    /// Idempotent.
    async fn remove_participant(&self, name: &str) -> AppResult<()>;

    /// Removes every participant with `last_seen <= cutoff` in one batch and
    /// returns their names.
    async fn remove_stale(&self, cutoff: i64) -> AppResult<Vec<String>>;

    /// Appends to the log, assigning the next id.
    async fn insert_message(&self, message: NewMessage) -> AppResult<Message>;

    /// The whole log in insertion order.
    async fn list_messages(&self) -> AppResult<Vec<Message>>;

    async fn find_message(&self, id: i64) -> AppResult<Option<Message>>;

    /// Returns whether a message was deleted.
    async fn delete_message(&self, id: i64) -> AppResult<bool>;

    /// Replaces `to`, `text` and `kind`. Returns the updated message, or
    /// `None` if it no longer exists.
    async fn update_message(&self, id: i64, draft: &Draft) -> AppResult<Option<Message>>;
}
