//! In-process change feed. Writes made through the [`Backend`](super::Backend)
//! are fanned out over a broadcast channel; each [`Subscription`] only yields
//! the events of the user it was opened for.

use std::sync::{PoisonError, RwLock};

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;

use crate::models::ChangeEvent;
use crate::utils::FeedError;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
struct Envelope {
    user_id: String,
    event: ChangeEvent,
}

#[derive(Debug)]
pub struct ChangeHub {
    tx: RwLock<Option<broadcast::Sender<Envelope>>>,
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::with_capacity(CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx: RwLock::new(Some(tx)),
        }
    }

    pub fn publish(&self, user_id: &str, event: ChangeEvent) {
        let tx = self.tx.read().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = tx.as_ref() else {
            debug!(user_id, "change feed is closed, dropping event");
            return;
        };
        // no receivers is fine: nobody is watching this user right now
        let receivers = tx
            .send(Envelope {
                user_id: user_id.to_string(),
                event,
            })
            .unwrap_or(0);
        debug!(user_id, receivers, "published change event");
    }

    pub fn subscribe(&self, user_id: &str) -> Result<Subscription, FeedError> {
        let tx = self.tx.read().unwrap_or_else(PoisonError::into_inner);
        let rx = tx.as_ref().ok_or(FeedError::Unavailable)?.subscribe();
        Ok(Subscription {
            user_id: user_id.to_string(),
            rx,
        })
    }

    /// Number of open subscriptions across all users.
    pub fn active_channels(&self) -> usize {
        self.tx
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, |tx| tx.receiver_count())
    }

    /// Shuts the feed down. Open subscriptions observe [`FeedError::Closed`]
    /// and new ones fail with [`FeedError::Unavailable`].
    pub fn close(&self) {
        self.tx.write().unwrap_or_else(PoisonError::into_inner).take();
    }
}

/// A live channel filtered to one user. Dropping it releases the channel.
#[derive(Debug)]
pub struct Subscription {
    user_id: String,
    rx: broadcast::Receiver<Envelope>,
}

impl Subscription {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub async fn recv(&mut self) -> Result<ChangeEvent, FeedError> {
        loop {
            match self.rx.recv().await {
                Ok(envelope) if envelope.user_id == self.user_id => return Ok(envelope.event),
                Ok(_) => continue,
                Err(RecvError::Lagged(missed)) => return Err(FeedError::Lagged(missed)),
                Err(RecvError::Closed) => return Err(FeedError::Closed),
            }
        }
    }

    pub fn unsubscribe(self) {}
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::models::ChangeEvent;

    #[tokio::test]
    async fn events_are_filtered_by_user() {
        let hub = ChangeHub::new();
        let mut alice = hub.subscribe("alice").unwrap();
        assert_eq!(alice.user_id(), "alice");

        hub.publish("bob", ChangeEvent::Delete { old_id: 1 });
        hub.publish("alice", ChangeEvent::Delete { old_id: 2 });

        assert_eq!(alice.recv().await, Ok(ChangeEvent::Delete { old_id: 2 }));
    }

    #[tokio::test]
    async fn unsubscribe_releases_the_channel() {
        let hub = ChangeHub::new();
        let first = hub.subscribe("alice").unwrap();
        let second = hub.subscribe("alice").unwrap();
        assert_eq!(hub.active_channels(), 2);

        first.unsubscribe();
        assert_eq!(hub.active_channels(), 1);
        drop(second);
        assert_eq!(hub.active_channels(), 0);
    }

    #[tokio::test]
    async fn close_ends_subscriptions() {
        let hub = ChangeHub::new();
        let mut alice = hub.subscribe("alice").unwrap();

        hub.close();
        hub.publish("alice", ChangeEvent::Delete { old_id: 1 });

        assert_eq!(alice.recv().await, Err(FeedError::Closed));
        assert_eq!(hub.subscribe("alice").unwrap_err(), FeedError::Unavailable);
        assert_eq!(hub.active_channels(), 0);
    }

    #[tokio::test]
    async fn slow_subscriber_reports_lag() {
        let hub = ChangeHub::with_capacity(2);
        let mut alice = hub.subscribe("alice").unwrap();

        for id in 0..5 {
            hub.publish("alice", ChangeEvent::Delete { old_id: id });
        }

        assert_eq!(alice.recv().await, Err(FeedError::Lagged(3)));
        assert_eq!(alice.recv().await, Ok(ChangeEvent::Delete { old_id: 3 }));
    }
}
