//! Shared state bus - publish/subscribe between game instances in one process
//!
//! Construct one bus per room and hand an `Arc` to every participant; there is
//! no global instance. Keys live in a namespace:
//!
//! ```text
//! {namespace}:player:{id}    latest PlayerSnapshot (JSON)
//! {namespace}:garbage:{id}   latest GarbageEvent addressed to {id} (JSON)
//! ```
//!
//! The garbage log is append-only. [`SharedStateBus::take_garbage`] sums and
//! marks a recipient's unconsumed events in one step, so each attack lands
//! exactly once.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::warn;
use tokio::sync::broadcast;

use crate::protocol::{now_ms, GarbageEvent, PlayerSnapshot};

/// Capacity of the broadcast channel; slow subscribers see `Lagged`
const BROADCAST_CAPACITY: usize = 256;

/// A published value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub key: String,
    pub payload: String,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct SharedStateBus {
    namespace: String,
    state: Mutex<BTreeMap<String, String>>,
    garbage: Mutex<Vec<GarbageEvent>>,
    tx: broadcast::Sender<BusMessage>,
}

impl SharedStateBus {
    pub fn new(namespace: impl Into<String>) -> Self {
        let (tx, _rx) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            namespace: namespace.into(),
            state: Mutex::new(BTreeMap::new()),
            garbage: Mutex::new(Vec::new()),
            tx,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn key(&self, kind: &str, id: &str) -> String {
        format!("{}:{}:{}", self.namespace, kind, id)
    }

    pub fn player_key(&self, player_id: &str) -> String {
        self.key("player", player_id)
    }

    pub fn garbage_key(&self, player_id: &str) -> String {
        self.key("garbage", player_id)
    }

    /// Store `payload` under `key` and notify subscribers.
    ///
    /// Returns the number of subscribers that were notified.
    pub fn publish(&self, key: impl Into<String>, payload: impl Into<String>) -> usize {
        let msg = BusMessage {
            key: key.into(),
            payload: payload.into(),
        };
        lock(&self.state).insert(msg.key.clone(), msg.payload.clone());
        // No subscribers is fine; the value is still stored.
        self.tx.send(msg).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.tx.subscribe()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        lock(&self.state).get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        lock(&self.state).remove(key)
    }

    pub fn publish_snapshot(&self, snapshot: &PlayerSnapshot) -> serde_json::Result<usize> {
        let payload = serde_json::to_string(snapshot)?;
        Ok(self.publish(self.player_key(&snapshot.player_id), payload))
    }

    pub fn snapshot(&self, player_id: &str) -> Option<PlayerSnapshot> {
        let raw = self.get(&self.player_key(player_id))?;
        serde_json::from_str(&raw).ok()
    }

    /// All published player snapshots, ordered by key
    pub fn players(&self) -> Vec<PlayerSnapshot> {
        let prefix = format!("{}:player:", self.namespace);
        let state = lock(&self.state);
        state
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .filter_map(|(k, v)| match serde_json::from_str(v) {
                Ok(snap) => Some(snap),
                Err(e) => {
                    warn!("skipping unreadable snapshot at {}: {}", k, e);
                    None
                }
            })
            .collect()
    }

    /// Append an attack to the garbage log; returns its id
    pub fn send_garbage(&self, from: &str, to: &str, rows: u32) -> u64 {
        let event = {
            let mut log = lock(&self.garbage);
            let event = GarbageEvent {
                id: log.len() as u64 + 1,
                from: from.to_string(),
                to: to.to_string(),
                rows,
                ts: now_ms(),
                consumed: false,
            };
            log.push(event.clone());
            event
        };

        match serde_json::to_string(&event) {
            Ok(payload) => {
                self.publish(self.garbage_key(to), payload);
            }
            Err(e) => warn!("garbage event {} not broadcast: {}", event.id, e),
        }
        event.id
    }

    /// Total unconsumed rows addressed to `player_id`; marks them consumed
    pub fn take_garbage(&self, player_id: &str) -> u32 {
        let mut log = lock(&self.garbage);
        log.iter_mut()
            .filter(|e| !e.consumed && e.to == player_id)
            .map(|e| {
                e.consumed = true;
                e.rows
            })
            .sum()
    }

    pub fn garbage_log(&self) -> Vec<GarbageEvent> {
        lock(&self.garbage).clone()
    }
}

impl std::fmt::Debug for SharedStateBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedStateBus")
            .field("namespace", &self.namespace)
            .field("keys", &lock(&self.state).len())
            .field("garbage_events", &lock(&self.garbage).len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_get_and_subscribe() {
        let bus = SharedStateBus::new("room");
        let mut rx = bus.subscribe();

        assert_eq!(bus.publish("room:x:1", "hello"), 1);
        assert_eq!(bus.get("room:x:1").as_deref(), Some("hello"));

        let msg = rx.try_recv().unwrap();
        assert_eq!(msg.key, "room:x:1");
        assert_eq!(msg.payload, "hello");
    }

    #[test]
    fn test_publish_without_subscribers_still_stores() {
        let bus = SharedStateBus::new("room");
        assert_eq!(bus.publish("k", "v"), 0);
        assert_eq!(bus.get("k").as_deref(), Some("v"));
        assert_eq!(bus.remove("k").as_deref(), Some("v"));
        assert_eq!(bus.get("k"), None);
    }

    #[test]
    fn test_keys_are_namespaced() {
        let bus = SharedStateBus::new("lab");
        assert_eq!(bus.player_key("7"), "lab:player:7");
        assert_eq!(bus.garbage_key("7"), "lab:garbage:7");
    }

    #[test]
    fn test_garbage_consumed_once() {
        let bus = SharedStateBus::new("room");
        bus.send_garbage("a", "b", 1);
        bus.send_garbage("c", "b", 2);
        bus.send_garbage("b", "a", 5);

        assert_eq!(bus.take_garbage("b"), 3);
        assert_eq!(bus.take_garbage("b"), 0);
        assert_eq!(bus.take_garbage("a"), 5);

        let log = bus.garbage_log();
        assert_eq!(log.len(), 3);
        assert!(log.iter().all(|e| e.consumed));
        assert_eq!(log[0].id, 1);
    }

    #[test]
    fn test_garbage_broadcast_to_recipient_key() {
        let bus = SharedStateBus::new("room");
        let id = bus.send_garbage("a", "b", 2);
        let raw = bus.get("room:garbage:b").unwrap();
        let event: GarbageEvent = serde_json::from_str(&raw).unwrap();
        assert_eq!(event.id, id);
        assert_eq!(event.rows, 2);
    }

    #[test]
    fn test_players_skips_other_kinds() {
        let bus = SharedStateBus::new("room");
        bus.publish("room:player:zz", "not json");
        bus.publish("room:garbage:a", "{}");
        bus.publish("other:player:a", "{}");
        assert!(bus.players().is_empty());
    }
}
