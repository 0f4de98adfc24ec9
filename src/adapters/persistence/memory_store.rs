//! Implements ConversationStore in memory.
//!
//! Bounded: entries expire `ttl` after their last write, and the map never holds more than
//! `capacity` senders (expired entries are swept first, then the oldest write is evicted).

use crate::domain::{ConversationState, DomainError};
use crate::ports::ConversationStore;
use crate::shared::config::{DEFAULT_STATE_CAPACITY, DEFAULT_STATE_TTL_SECS};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

struct Entry {
    state: ConversationState,
    written_at: Instant,
}

/// Single-process store keyed by sender id.
pub struct MemoryConversationStore {
    entries: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
    capacity: usize,
}

impl MemoryConversationStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Make room for one more sender.
    fn evict(&self, entries: &mut HashMap<String, Entry>) {
        let ttl = self.ttl;
        entries.retain(|_, e| e.written_at.elapsed() < ttl);
        if entries.len() < self.capacity {
            return;
        }
        let oldest = entries
            .iter()
            .min_by_key(|(_, e)| e.written_at)
            .map(|(k, _)| k.clone());
        if let Some(sender_id) = oldest {
            debug!(sender_id = %sender_id, "state store full, evicting oldest conversation");
            entries.remove(&sender_id);
        }
    }
}

impl Default for MemoryConversationStore {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_STATE_TTL_SECS),
            DEFAULT_STATE_CAPACITY,
        )
    }
}

#[async_trait::async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn get(&self, sender_id: &str) -> Result<ConversationState, DomainError> {
        let entries = self.entries.read().await;
        Ok(match entries.get(sender_id) {
            Some(e) if e.written_at.elapsed() < self.ttl => e.state.clone(),
            _ => ConversationState::Idle,
        })
    }

    async fn set(&self, sender_id: &str, state: ConversationState) -> Result<(), DomainError> {
        if !state.is_active() {
            return self.clear(sender_id).await;
        }
        let mut entries = self.entries.write().await;
        if !entries.contains_key(sender_id) && entries.len() >= self.capacity {
            self.evict(&mut entries);
        }
        entries.insert(
            sender_id.to_string(),
            Entry {
                state,
                written_at: Instant::now(),
            },
        );
        Ok(())
    }

    async fn clear(&self, sender_id: &str) -> Result<(), DomainError> {
        self.entries.write().await.remove(sender_id);
        Ok(())
    }
}
