use std::time::Duration;

use async_trait::async_trait;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use tracing::info;

use crate::{
    AppError, AppResult,
    messages::{Draft, Message, MessageKind, NewMessage},
    participants::Participant,
};

use super::ChatStore;

type MessageRow = (i64, String, String, String, String, String);

const MESSAGE_COLUMNS: &str = "id,sender,recipient,text,kind,time";

#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_pool: SqlitePool,
}

impl SqliteStore {
    /// Opens a pool on `database_url` and creates the schema if needed.
    pub async fn connect(database_url: &str, max_connections: u32) -> AppResult<Self> {
        let options = SqlitePoolOptions::new();
        // every connection to `:memory:` is its own database
        let options = if database_url.contains(":memory:") {
            options
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            options.max_connections(max_connections)
        };

        let db_pool = options.connect(database_url).await?;
        Self::new(db_pool).await
    }

    pub async fn new(db_pool: SqlitePool) -> AppResult<Self> {
        let store = Self { db_pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS participants (
                name TEXT PRIMARY KEY NOT NULL,
                last_seen INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.db_pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sender TEXT NOT NULL,
                recipient TEXT NOT NULL,
                text TEXT NOT NULL,
                kind TEXT NOT NULL,
                time TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.db_pool)
        .await?;

        info!("sqlite schema ready");
        Ok(())
    }
}

fn into_message((id, from, to, text, kind, time): MessageRow) -> AppResult<Message> {
    let kind = kind
        .parse::<MessageKind>()
        .map_err(|err| AppError::Store(anyhow::anyhow!("message {id} in store: {err}")))?;

    Ok(Message { id, from, to, text, kind, time })
}

#[async_trait]
impl ChatStore for SqliteStore {
    async fn insert_participant(&self, participant: &Participant) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO participants (name,last_seen) VALUES (?,?) ON CONFLICT(name) DO NOTHING",
        )
        .bind(&participant.name)
        .bind(participant.last_seen)
        .execute(&self.db_pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn touch_participant(&self, name: &str, last_seen: i64) -> AppResult<bool> {
        let result = sqlx::query("UPDATE participants SET last_seen=? WHERE name=?")
            .bind(last_seen)
            .bind(name)
            .execute(&self.db_pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_participant(&self, name: &str) -> AppResult<Option<Participant>> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT name,last_seen FROM participants WHERE name=?")
                .bind(name)
                .fetch_optional(&self.db_pool)
                .await?;

        Ok(row.map(|(name, last_seen)| Participant { name, last_seen }))
    }

    async fn list_participants(&self) -> AppResult<Vec<Participant>> {
        let rows: Vec<(String, i64)> = sqlx::query_as("SELECT name,last_seen FROM participants")
            .fetch_all(&self.db_pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(name, last_seen)| Participant { name, last_seen })
            .collect())
    }

    async fn remove_participant(&self, name: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM participants WHERE name=?")
            .bind(name)
            .execute(&self.db_pool)
            .await?;
        Ok(())
    }

    async fn remove_stale(&self, cutoff: i64) -> AppResult<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("DELETE FROM participants WHERE last_seen<=? RETURNING name")
                .bind(cutoff)
                .fetch_all(&self.db_pool)
                .await?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn insert_message(
        &self,
        NewMessage { from, draft, time }: NewMessage,
    ) -> AppResult<Message> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO messages (sender,recipient,text,kind,time) \
             VALUES (?,?,?,?,?) RETURNING id",
        )
        .bind(&from)
        .bind(&draft.to)
        .bind(&draft.text)
        .bind(draft.kind.as_str())
        .bind(&time)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(Message {
            id,
            from,
            to: draft.to,
            text: draft.text,
            kind: draft.kind,
            time,
        })
    }

    async fn list_messages(&self) -> AppResult<Vec<Message>> {
        let rows: Vec<MessageRow> =
            sqlx::query_as(&format!("SELECT {MESSAGE_COLUMNS} FROM messages ORDER BY id"))
                .fetch_all(&self.db_pool)
                .await?;

        rows.into_iter().map(into_message).collect()
    }

    async fn find_message(&self, id: i64) -> AppResult<Option<Message>> {
        let row: Option<MessageRow> =
            sqlx::query_as(&format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id=?"))
                .bind(id)
                .fetch_optional(&self.db_pool)
                .await?;

        row.map(into_message).transpose()
    }

    async fn delete_message(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM messages WHERE id=?")
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_message(&self, id: i64, draft: &Draft) -> AppResult<Option<Message>> {
        let row: Option<MessageRow> = sqlx::query_as(&format!(
            "UPDATE messages SET recipient=?,text=?,kind=? WHERE id=? RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(&draft.to)
        .bind(&draft.text)
        .bind(draft.kind.as_str())
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        row.map(into_message).transpose()
    }
}
