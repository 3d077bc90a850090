//! In-process hub for session change notifications.

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;
use uuid::Uuid;

use babycare_types::events::SessionEvent;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct SessionHub {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn publish(&self, event: SessionEvent) {
        // No subscribers is not an error.
        let _ = self.tx.send(event);
    }

    /// Subscribe to events for one user. Dropping the returned
    /// subscription unsubscribes.
    pub fn subscribe(&self, user_id: Uuid) -> SessionSubscription {
        SessionSubscription {
            user_id,
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SessionSubscription {
    user_id: Uuid,
    rx: broadcast::Receiver<SessionEvent>,
}

impl SessionSubscription {
    /// Next event addressed to this subscription's user, or `None` once the
    /// hub is gone.
    pub async fn next(&mut self) -> Option<SessionEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.user_id() == self.user_id => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Session subscriber for {} lagged, skipped {} events", self.user_id, skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_only_sees_own_events() {
        let hub = SessionHub::new();
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut sub = hub.subscribe(me);

        hub.publish(SessionEvent::UserUpdated { user_id: other });
        let signed_out = SessionEvent::SignedOut { user_id: me, session_id: Uuid::new_v4() };
        hub.publish(signed_out.clone());

        assert_eq!(sub.next().await, Some(signed_out));
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let hub = SessionHub::new();
        let sub = hub.subscribe(Uuid::new_v4());
        assert_eq!(hub.subscriber_count(), 1);
        drop(sub);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn closed_hub_ends_subscription() {
        let hub = SessionHub::new();
        let mut sub = hub.subscribe(Uuid::new_v4());
        drop(hub);
        assert_eq!(sub.next().await, None);
    }
}
