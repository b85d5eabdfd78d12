//! Broadcast queue used to publish scheduler events.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::{Result, TickflowError};

/// Broadcast queue for one-to-many message distribution.
///
/// Every subscriber receives every message sent after it subscribed.
/// Backed by tokio's broadcast channel.
#[derive(Clone)]
pub struct BroadcastQueue<T> {
    sender: Arc<broadcast::Sender<T>>,
}

impl<T: Clone> BroadcastQueue<T> {
    /// create a new broadcast queue
    pub fn new(cap: usize) -> Arc<Self> {
        let (tx, _) = broadcast::channel(cap);

        Arc::new(Self {
            sender: Arc::new(tx),
        })
    }

    /// send a message to the queue, fails when nobody is subscribed
    pub fn send(
        &self,
        msg: T,
    ) -> Result<()> {
        self.sender.send(msg).map_err(|e| TickflowError::Queue(e.to_string()))?;
        Ok(())
    }

    /// subscribe to the queue
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_without_subscriber() {
        let queue = BroadcastQueue::<u32>::new(4);
        assert!(queue.send(1).is_err());
    }

    #[test]
    fn test_subscriber_receives() {
        let queue = BroadcastQueue::<u32>::new(4);
        let mut rx = queue.subscribe();
        queue.send(7).unwrap();
        assert_eq!(rx.try_recv().unwrap(), 7);
    }
}
