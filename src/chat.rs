//! Presence and messaging rules on top of a [`ChatStore`].
//!
//! A participant is `absent` until registered, stays `present` while it keeps
//! sending heartbeats, and becomes `absent` again when the sweeper evicts it
//! or it is removed explicitly.

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    AppError, AppResult,
    clock::{self, Clock},
    messages::{Draft, Message, MessageFields, MessageKind, NewMessage, visibility},
    participants::{self, Participant},
    store::ChatStore,
};

#[derive(Clone)]
pub struct Chat {
    store: Arc<dyn ChatStore>,
    clock: Arc<dyn Clock>,
}

impl Chat {
    pub fn new(store: Arc<dyn ChatStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Registers `name` and announces the join to the room.
    pub async fn register(&self, name: Option<&str>) -> AppResult<Participant> {
        let name = participants::validate_name(name)?;
        let participant = Participant {
            name,
            last_seen: clock::unix_millis(self.clock.now()),
        };

        if !self.store.insert_participant(&participant).await? {
            return Err(AppError::Conflict(format!("{} is already in the room", participant.name)));
        }
        info!("{} joined", participant.name);

        self.append(&participant.name, Draft::join()).await?;
        Ok(participant)
    }

    pub async fn heartbeat(&self, name: &str) -> AppResult<()> {
        let now = clock::unix_millis(self.clock.now());
        if !self.store.touch_participant(name, now).await? {
            return Err(AppError::NotFound(format!("{name} is not in the room")));
        }

        debug!("heartbeat from {name}");
        Ok(())
    }

    pub async fn list(&self) -> AppResult<Vec<Participant>> {
        self.store.list_participants().await
    }

    /// Drops `name` from the roster without a leave notice. Idempotent.
    pub async fn remove(&self, name: &str) -> AppResult<()> {
        self.store.remove_participant(name).await?;
        info!("{name} removed");
        Ok(())
    }

    /// Removes every participant last seen at or before `cutoff` (Unix millis).
    pub(crate) async fn evict_stale(&self, cutoff: i64) -> AppResult<Vec<String>> {
        self.store.remove_stale(cutoff).await
    }

    /// Appends a validated message from `from`, stamped with the current time.
    pub async fn append(&self, from: &str, draft: Draft) -> AppResult<Message> {
        let time = clock::wall_time(self.clock.now());
        self.store
            .insert_message(NewMessage { from: from.to_owned(), draft, time })
            .await
    }

    /// Posts a client message. The sender must be in the room and may not
    /// forge status notices.
    pub async fn post(&self, from: &str, fields: MessageFields) -> AppResult<Message> {
        let draft = client_draft(fields)?;
        if self.store.find_participant(from).await?.is_none() {
            return Err(AppError::Validation(format!("{from} is not in the room")));
        }

        self.append(from, draft).await
    }

    /// Messages `viewer` may see, oldest first. With a `limit`, only the
    /// `limit` most recent of them.
    pub async fn recent(&self, viewer: &str, limit: Option<usize>) -> AppResult<Vec<Message>> {
        let messages = self.store.list_messages().await?;
        Ok(visibility::visible_tail(messages, viewer, limit))
    }

    pub async fn delete_owned(&self, id: i64, requester: &str) -> AppResult<()> {
        self.owned(id, requester).await?;
        if !self.store.delete_message(id).await? {
            return Err(not_found(id));
        }

        Ok(())
    }

    /// Replaces `to`, `text` and `type` of a message the requester sent.
    pub async fn edit_owned(
        &self,
        id: i64,
        requester: &str,
        fields: MessageFields,
    ) -> AppResult<Message> {
        let draft = client_draft(fields)?;
        self.owned(id, requester).await?;

        self.store
            .update_message(id, &draft)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn owned(&self, id: i64, requester: &str) -> AppResult<Message> {
        let message = self.store.find_message(id).await?.ok_or_else(|| not_found(id))?;
        if message.from != requester {
            return Err(AppError::Forbidden(format!("message {id} was not sent by {requester}")));
        }

        Ok(message)
    }
}

fn client_draft(fields: MessageFields) -> AppResult<Draft> {
    let draft = Draft::try_from(fields)?;
    if draft.kind == MessageKind::Status {
        return Err(AppError::Validation("status messages are sent by the server".to_owned()));
    }

    Ok(draft)
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("no message with id {id}"))
}
