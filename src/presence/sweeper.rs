use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{error, info, warn};

use crate::{
    chat::Chat,
    clock::{self, Clock},
    messages::Draft,
};

/// Background task evicting participants whose last heartbeat is older than
/// `stale_after`, posting a leave notice for each.
pub struct Sweeper {
    chat: Chat,
    stale_after: Duration,
    interval: Duration,
}

impl Sweeper {
    pub fn new(chat: Chat, stale_after: Duration, interval: Duration) -> Self {
        Self { chat, stale_after, interval }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        info!(
            "sweeping every {:?}, evicting after {:?}",
            self.interval, self.stale_after
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.sweep_once().await;
        }
    }

    /// One tick. Returns the names evicted.
    ///
    /// Never fails: removal happens in one batch, and a leave notice that
    /// cannot be written is logged and skipped.
    pub async fn sweep_once(&self) -> Vec<String> {
        let now = clock::unix_millis(self.chat.clock().now());
        // a threshold too large to subtract means nobody is stale yet
        let cutoff = i64::try_from(self.stale_after.as_millis())
            .ok()
            .and_then(|stale_after| now.checked_sub(stale_after))
            .unwrap_or(i64::MIN);

        let evicted = match self.chat.evict_stale(cutoff).await {
            Ok(evicted) => evicted,
            Err(err) => {
                error!("sweep failed: {err}");
                return Vec::new();
            }
        };

        for name in &evicted {
            info!("{name} timed out");
            if let Err(err) = self.chat.append(name, Draft::leave()).await {
                warn!("could not announce that {name} left: {err}");
            }
        }

        evicted
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use time::OffsetDateTime;

    use super::*;
    use crate::{
        AppError, AppResult,
        clock::ManualClock,
        messages::{BROADCAST_TARGET, LEAVE_NOTICE, Message, MessageKind, NewMessage},
        participants::Participant,
        store::{ChatStore, MemoryStore},
    };

    const STALE: Duration = Duration::from_secs(10);

    fn setup(store: Arc<dyn ChatStore>) -> (Sweeper, Chat, Arc<ManualClock>) {
        let start = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let chat = Chat::new(store, clock.clone());
        let sweeper = Sweeper::new(chat.clone(), STALE, Duration::from_secs(15));
        (sweeper, chat, clock)
    }

    fn leave_notices(log: &[Message]) -> Vec<&str> {
        log.iter()
            .filter(|m| m.kind == MessageKind::Status && m.text == LEAVE_NOTICE)
            .map(|m| m.from.as_str())
            .collect()
    }

    #[tokio::test]
    async fn evicts_stale_participants_once() {
        let (sweeper, chat, clock) = setup(Arc::new(MemoryStore::new()));
        chat.register(Some("alice")).await.unwrap();
        chat.register(Some("bob")).await.unwrap();

        clock.advance(Duration::from_secs(6));
        chat.heartbeat("bob").await.unwrap();
        clock.advance(Duration::from_secs(5));

        assert_eq!(sweeper.sweep_once().await, ["alice"]);
        let roster: Vec<String> =
            chat.list().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(roster, ["bob"]);

        let log = chat.recent("carol", None).await.unwrap();
        assert_eq!(leave_notices(&log), ["alice"]);
        let notice = log.last().unwrap();
        assert_eq!(notice.to, BROADCAST_TARGET);

        // nothing left to evict
        assert!(sweeper.sweep_once().await.is_empty());
        assert_eq!(chat.recent("carol", None).await.unwrap().len(), log.len());
    }

    #[tokio::test]
    async fn threshold_is_inclusive() {
        let (sweeper, chat, clock) = setup(Arc::new(MemoryStore::new()));
        chat.register(Some("alice")).await.unwrap();

        clock.advance(STALE - Duration::from_millis(1));
        assert!(sweeper.sweep_once().await.is_empty());

        clock.advance(Duration::from_millis(1));
        assert_eq!(sweeper.sweep_once().await, ["alice"]);
    }

    #[tokio::test]
    async fn huge_threshold_never_evicts() {
        let store: Arc<dyn ChatStore> = Arc::new(MemoryStore::new());
        let (_, chat, clock) = setup(store);
        chat.register(Some("alice")).await.unwrap();
        clock.advance(Duration::from_secs(3600));

        for stale_after in [
            Duration::from_secs(10_000_000_000_000_000),
            Duration::from_millis(i64::MAX as u64),
            Duration::MAX,
        ] {
            let sweeper = Sweeper::new(chat.clone(), stale_after, Duration::from_secs(15));
            assert!(sweeper.sweep_once().await.is_empty());
        }
        assert_eq!(chat.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn evicts_everyone_stale_in_one_tick() {
        let (sweeper, chat, clock) = setup(Arc::new(MemoryStore::new()));
        for name in ["a", "b", "c"] {
            chat.register(Some(name)).await.unwrap();
        }
        clock.advance(Duration::from_secs(60));

        let mut evicted = sweeper.sweep_once().await;
        evicted.sort();
        assert_eq!(evicted, ["a", "b", "c"]);
        assert!(chat.list().await.unwrap().is_empty());

        let log = chat.recent("x", None).await.unwrap();
        let mut left = leave_notices(&log);
        left.sort();
        assert_eq!(left, ["a", "b", "c"]);
    }

    /// Refuses to store messages from one sender.
    struct RefusingStore {
        inner: MemoryStore,
        refuse: &'static str,
    }

    #[async_trait]
    impl ChatStore for RefusingStore {
        async fn insert_participant(&self, participant: &Participant) -> AppResult<bool> {
            self.inner.insert_participant(participant).await
        }

        async fn touch_participant(&self, name: &str, last_seen: i64) -> AppResult<bool> {
            self.inner.touch_participant(name, last_seen).await
        }

        async fn find_participant(&self, name: &str) -> AppResult<Option<Participant>> {
            self.inner.find_participant(name).await
        }

        async fn list_participants(&self) -> AppResult<Vec<Participant>> {
            self.inner.list_participants().await
        }

        async fn remove_participant(&self, name: &str) -> AppResult<()> {
            self.inner.remove_participant(name).await
        }

        async fn remove_stale(&self, cutoff: i64) -> AppResult<Vec<String>> {
            self.inner.remove_stale(cutoff).await
        }

        async fn insert_message(&self, message: NewMessage) -> AppResult<Message> {
            if message.from == self.refuse && message.draft.text == LEAVE_NOTICE {
                return Err(AppError::Store(anyhow::anyhow!("disk full")));
            }
            self.inner.insert_message(message).await
        }

        async fn list_messages(&self) -> AppResult<Vec<Message>> {
            self.inner.list_messages().await
        }

        async fn find_message(&self, id: i64) -> AppResult<Option<Message>> {
            self.inner.find_message(id).await
        }

        async fn delete_message(&self, id: i64) -> AppResult<bool> {
            self.inner.delete_message(id).await
        }

        async fn update_message(&self, id: i64, draft: &Draft) -> AppResult<Option<Message>> {
            self.inner.update_message(id, draft).await
        }
    }

    #[tokio::test]
    async fn failed_notice_does_not_stop_the_tick() {
        let store = Arc::new(RefusingStore { inner: MemoryStore::new(), refuse: "a" });
        let (sweeper, chat, clock) = setup(store);
        chat.register(Some("a")).await.unwrap();
        chat.register(Some("b")).await.unwrap();
        clock.advance(Duration::from_secs(30));

        let mut evicted = sweeper.sweep_once().await;
        evicted.sort();
        assert_eq!(evicted, ["a", "b"]);
        assert!(chat.list().await.unwrap().is_empty());

        let log = chat.recent("x", None).await.unwrap();
        assert_eq!(leave_notices(&log), ["b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_task_sweeps_on_its_interval() {
        let (sweeper, chat, clock) = setup(Arc::new(MemoryStore::new()));
        chat.register(Some("alice")).await.unwrap();
        clock.advance(Duration::from_secs(20));

        let handle = sweeper.spawn();
        // first tick fires immediately
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(chat.list().await.unwrap().is_empty());

        handle.abort();
    }
}
