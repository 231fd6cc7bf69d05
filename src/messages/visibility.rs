use super::{BROADCAST_TARGET, Message, MessageKind};

/// Whether `viewer` may retrieve `message`.
///
/// Anything addressed to the room, sent by or to the viewer, or posted as a
/// public chat message is visible. Private messages stay between their two
/// ends.
pub fn is_visible(message: &Message, viewer: &str) -> bool {
    message.to == BROADCAST_TARGET
        || message.from == viewer
        || message.to == viewer
        || message.kind == MessageKind::Broadcast
}

/// The last `limit` messages of `messages` visible to `viewer`, oldest first.
/// `None` keeps the whole visible history.
pub fn visible_tail(messages: Vec<Message>, viewer: &str, limit: Option<usize>) -> Vec<Message> {
    let visible: Vec<Message> = messages
        .into_iter()
        .filter(|message| is_visible(message, viewer))
        .collect();

    let skip = limit.map_or(0, |limit| visible.len().saturating_sub(limit));
    visible.into_iter().skip(skip).collect()
}
