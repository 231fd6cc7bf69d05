use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Recipient meaning "everyone in the room".
pub const BROADCAST_TARGET: &str = "Todos";
pub const JOIN_NOTICE: &str = "entra na sala...";
pub const LEAVE_NOTICE: &str = "sai da sala...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Broadcast,
    Private,
    /// System-generated join/leave notice.
    Status,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Broadcast => "broadcast",
            MessageKind::Private => "private",
            MessageKind::Status => "status",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "broadcast" | "message" => Ok(MessageKind::Broadcast),
            "private" | "private_message" => Ok(MessageKind::Private),
            "status" => Ok(MessageKind::Status),
            other => Err(AppError::Validation(format!("unknown message type {other:?}"))),
        }
    }
}

/// A stored chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: i64,
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// `HH:MM:SS` at creation.
    pub time: String,
}

/// Message body as sent by a client, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageFields {
    pub to: Option<String>,
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// The mutable part of a message, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub to: String,
    pub text: String,
    pub kind: MessageKind,
}

impl Draft {
    pub fn join() -> Self {
        Self::notice(JOIN_NOTICE)
    }

    pub fn leave() -> Self {
        Self::notice(LEAVE_NOTICE)
    }

    fn notice(text: &str) -> Self {
        Self {
            to: BROADCAST_TARGET.to_owned(),
            text: text.to_owned(),
            kind: MessageKind::Status,
        }
    }
}

impl TryFrom<MessageFields> for Draft {
    type Error = AppError;

    fn try_from(MessageFields { to, text, kind }: MessageFields) -> AppResult<Self> {
        Ok(Self {
            to: required("to", to)?,
            text: required("text", text)?,
            kind: required("type", kind)?.parse()?,
        })
    }
}

fn required(field: &str, value: Option<String>) -> AppResult<String> {
    let value = value.ok_or_else(|| AppError::Validation(format!("{field} is required")))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }

    Ok(value.to_owned())
}

/// Row to insert. `id` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub from: String,
    pub draft: Draft,
    pub time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(to: Option<&str>, text: Option<&str>, kind: Option<&str>) -> MessageFields {
        MessageFields {
            to: to.map(str::to_owned),
            text: text.map(str::to_owned),
            kind: kind.map(str::to_owned),
        }
    }

    #[test]
    fn accepts_current_and_legacy_kind_names() {
        for (name, kind) in [
            ("broadcast", MessageKind::Broadcast),
            ("message", MessageKind::Broadcast),
            ("private", MessageKind::Private),
            ("private_message", MessageKind::Private),
            ("status", MessageKind::Status),
        ] {
            assert_eq!(name.parse::<MessageKind>().unwrap(), kind);
        }
        assert!(matches!("shout".parse::<MessageKind>(), Err(AppError::Validation(_))));
    }

    #[test]
    fn draft_trims_and_requires_every_field() {
        let draft = Draft::try_from(fields(Some(" bob "), Some(" hi "), Some("private"))).unwrap();
        assert_eq!(draft.to, "bob");
        assert_eq!(draft.text, "hi");
        assert_eq!(draft.kind, MessageKind::Private);

        for bad in [
            fields(None, Some("hi"), Some("message")),
            fields(Some("bob"), None, Some("message")),
            fields(Some("bob"), Some("hi"), None),
            fields(Some("bob"), Some("  "), Some("message")),
            fields(Some("bob"), Some("hi"), Some("whisper")),
        ] {
            assert!(matches!(Draft::try_from(bad), Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn wire_shape() {
        let message = Message {
            id: 7,
            from: "alice".to_owned(),
            to: BROADCAST_TARGET.to_owned(),
            text: JOIN_NOTICE.to_owned(),
            kind: MessageKind::Status,
            time: "10:00:00".to_owned(),
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            serde_json::json!({
                "id": 7,
                "from": "alice",
                "to": "Todos",
                "text": "entra na sala...",
                "type": "status",
                "time": "10:00:00",
            })
        );
    }
}
