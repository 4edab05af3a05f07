//! Transient status line
//!
//! Holds at most one message in a watch channel. Each message clears itself
//! after a timeout unless a newer one replaced it first.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Message slot: posting generation and text
type Slot = Option<(u64, String)>;

#[derive(Debug, Clone)]
pub struct StatusLine {
    tx: Arc<watch::Sender<Slot>>,
    rx: watch::Receiver<Slot>,
    generation: Arc<AtomicU64>,
    ttl: Duration,
}

impl StatusLine {
    pub fn new(ttl: Duration) -> Self {
        let (tx, rx) = watch::channel(None);
        Self {
            tx: Arc::new(tx),
            rx,
            generation: Arc::new(AtomicU64::new(0)),
            ttl,
        }
    }

    /// Show `message` until the timeout passes. Must run inside a tokio runtime.
    pub fn post(&self, message: impl Into<String>) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.tx.send_replace(Some((generation, message.into())));

        let tx = Arc::clone(&self.tx);
        let ttl = self.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            tx.send_if_modified(|current| {
                let expired = matches!(current, Some((posted, _)) if *posted == generation);
                if expired {
                    *current = None;
                }
                expired
            });
        });
    }

    /// Message currently on display
    pub fn current(&self) -> Option<String> {
        self.rx.borrow().as_ref().map(|(_, message)| message.clone())
    }

    pub fn clear(&self) {
        self.tx.send_replace(None);
    }
}
