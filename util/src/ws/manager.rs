//! Topic registry backed by Tokio broadcast channels, with presence tracking.
//!
//! A topic's channel is created on first subscription and dropped once a
//! broadcast finds nobody listening. Presence is a per-topic refcount of user
//! ids so a user with two open tabs counts once.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

/// Buffered messages per topic before slow receivers start lagging.
const TOPIC_CAPACITY: usize = 100;

type Topic = String;
type Sender = broadcast::Sender<String>;
type Receiver = broadcast::Receiver<String>;

#[derive(Clone, Default)]
pub struct WebSocketManager {
    inner: Arc<RwLock<HashMap<Topic, Sender>>>,
    /// topic -> (user_id -> refcount)
    presence: Arc<RwLock<HashMap<Topic, HashMap<i64, usize>>>>,
}

impl WebSocketManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to the given topic, creating it if necessary.
    pub async fn subscribe(&self, topic: &str) -> Receiver {
        let mut map = self.inner.write().await;
        map.entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .subscribe()
    }

    /// Broadcasts a message to all subscribers of `topic` and returns how many
    /// received it.
    ///
    /// Unknown topics are a no-op. A topic left without receivers is removed.
    pub async fn broadcast<T: Into<String>>(&self, topic: &str, msg: T) -> usize {
        let mut map = self.inner.write().await;
        let Some(sender) = map.get(topic) else {
            return 0;
        };
        let delivered = sender.send(msg.into()).unwrap_or(0);
        if sender.receiver_count() == 0 {
            tracing::debug!("Removing topic '{topic}' due to no subscribers.");
            map.remove(topic);
        }
        delivered
    }

    /// Removes `topic` if nobody is subscribed any more.
    ///
    /// Per-session topics may never see another broadcast, so connections
    /// call this on teardown instead of waiting for `broadcast` to notice.
    pub async fn release(&self, topic: &str) -> bool {
        let mut map = self.inner.write().await;
        let idle = map
            .get(topic)
            .is_some_and(|sender| sender.receiver_count() == 0);
        if idle {
            tracing::debug!("Releasing idle topic '{topic}'.");
            map.remove(topic);
        }
        idle
    }

    /// Current number of live receivers on `topic`.
    #[cfg(test)]
    pub async fn subscriber_count(&self, topic: &str) -> usize {
        self.inner
            .read()
            .await
            .get(topic)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }

    pub async fn has_topic(&self, topic: &str) -> bool {
        self.inner.read().await.contains_key(topic)
    }

    // -------------------- Presence --------------------

    /// Increment presence refcount for `user_id` on `topic`.
    pub async fn register(&self, topic: &str, user_id: i64) {
        let mut p = self.presence.write().await;
        let entry = p.entry(topic.to_string()).or_default();
        *entry.entry(user_id).or_insert(0) += 1;
    }

    /// Decrement presence refcount for `user_id` on `topic`.
    pub async fn unregister(&self, topic: &str, user_id: i64) {
        let mut p = self.presence.write().await;
        if let Some(users) = p.get_mut(topic) {
            if let Some(cnt) = users.get_mut(&user_id) {
                if *cnt > 1 {
                    *cnt -= 1;
                } else {
                    users.remove(&user_id);
                }
            }
            if users.is_empty() {
                p.remove(topic);
            }
        }
    }

    #[cfg(test)]
    pub async fn is_user_present_on(&self, topic: &str, user_id: i64) -> bool {
        let p = self.presence.read().await;
        p.get(topic).and_then(|m| m.get(&user_id)).is_some()
    }

    /// Distinct users currently connected to `topic`.
    pub async fn present_users(&self, topic: &str) -> Vec<i64> {
        let p = self.presence.read().await;
        let mut ids: Vec<i64> = p
            .get(topic)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }
}
