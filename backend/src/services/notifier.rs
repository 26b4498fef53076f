use crate::models::MessageView;
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Best-effort delivery of new messages to a user's live listeners.
pub trait Notifier: Send + Sync {
    fn notify(&self, user_id: Uuid, message: &MessageView);
}

/// One broadcast channel per listening user, created on first subscription.
#[derive(Debug)]
pub struct BroadcastNotifier {
    channels: Mutex<HashMap<Uuid, broadcast::Sender<MessageView>>>,
    capacity: usize,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self, user_id: Uuid) -> broadcast::Receiver<MessageView> {
        let mut channels = self.channels();
        // drop channels whose listeners have all disconnected
        channels.retain(|_, sender| sender.receiver_count() > 0);
        channels
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    pub fn listener_count(&self, user_id: Uuid) -> usize {
        self.channels()
            .get(&user_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Users currently holding a channel.
    pub fn channel_count(&self) -> usize {
        self.channels().len()
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<Uuid, broadcast::Sender<MessageView>>> {
        self.channels.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, user_id: Uuid, message: &MessageView) {
        let mut channels = self.channels();
        let Some(sender) = channels.get(&user_id) else {
            tracing::debug!("No listener for user {}, message {} not pushed", user_id, message.id);
            return;
        };

        match sender.send(message.clone()) {
            Ok(listeners) => {
                tracing::debug!("Pushed message {} to {} listener(s) of user {}", message.id, listeners, user_id);
            }
            Err(_) => {
                // every receiver was dropped
                channels.remove(&user_id);
                tracing::debug!("Listeners of user {} are gone, channel dropped", user_id);
            }
        }
    }
}
