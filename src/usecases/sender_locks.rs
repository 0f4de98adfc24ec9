//! Per-sender turn serialization.
//!
//! A sender's turn (read state, step the flow, write state) runs under that sender's lock.
//! Different senders never wait on each other. Locks nobody holds or waits on are pruned
//! on the next acquire, so the map only tracks senders with a turn in flight.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct SenderLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SenderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for `sender_id`'s turn. The turn ends when the guard is dropped.
    pub async fn acquire(&self, sender_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            locks.entry(sender_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}
