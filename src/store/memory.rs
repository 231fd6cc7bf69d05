use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    AppResult,
    messages::{Draft, Message, NewMessage},
    participants::Participant,
};

use super::ChatStore;

/// Process-local store. One mutex guards both collections, so each call is
/// atomic with respect to every other.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    participants: HashMap<String, Participant>,
    messages: BTreeMap<i64, Message>,
    last_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn insert_participant(&self, participant: &Participant) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;
        if inner.participants.contains_key(&participant.name) {
            return Ok(false);
        }

        inner
            .participants
            .insert(participant.name.clone(), participant.clone());
        Ok(true)
    }

    async fn touch_participant(&self, name: &str, last_seen: i64) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(match inner.participants.get_mut(name) {
            Some(participant) => {
                participant.last_seen = last_seen;
                true
            }
            None => false,
        })
    }

    async fn find_participant(&self, name: &str) -> AppResult<Option<Participant>> {
        Ok(self.inner.lock().await.participants.get(name).cloned())
    }

    async fn list_participants(&self) -> AppResult<Vec<Participant>> {
        Ok(self.inner.lock().await.participants.values().cloned().collect())
    }

    async fn remove_participant(&self, name: &str) -> AppResult<()> {
        self.inner.lock().await.participants.remove(name);
        Ok(())
    }

    async fn remove_stale(&self, cutoff: i64) -> AppResult<Vec<String>> {
        let mut inner = self.inner.lock().await;
        let stale: Vec<String> = inner
            .participants
            .values()
            .filter(|p| p.last_seen <= cutoff)
            .map(|p| p.name.clone())
            .collect();
        for name in &stale {
            inner.participants.remove(name);
        }

        Ok(stale)
    }

    async fn insert_message(
        &self,
        NewMessage { from, draft, time }: NewMessage,
    ) -> AppResult<Message> {
        let mut inner = self.inner.lock().await;
        inner.last_id += 1;
        let message = Message {
            id: inner.last_id,
            from,
            to: draft.to,
            text: draft.text,
            kind: draft.kind,
            time,
        };
        inner.messages.insert(message.id, message.clone());

        Ok(message)
    }

    async fn list_messages(&self) -> AppResult<Vec<Message>> {
        Ok(self.inner.lock().await.messages.values().cloned().collect())
    }

    async fn find_message(&self, id: i64) -> AppResult<Option<Message>> {
        Ok(self.inner.lock().await.messages.get(&id).cloned())
    }

    async fn delete_message(&self, id: i64) -> AppResult<bool> {
        Ok(self.inner.lock().await.messages.remove(&id).is_some())
    }

    async fn update_message(&self, id: i64, draft: &Draft) -> AppResult<Option<Message>> {
        let mut inner = self.inner.lock().await;
        Ok(inner.messages.get_mut(&id).map(|message| {
            message.to = draft.to.clone();
            message.text = draft.text.clone();
            message.kind = draft.kind;
            message.clone()
        }))
    }
}
