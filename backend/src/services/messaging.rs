use crate::{
    db::messages,
    error::{AppError, AppResult},
    models::{Conversation, LatestMessage, Message, MessageView, UserName},
    services::{ConnectionLedger, Notifier, UserDirectory},
};
use chrono::Utc;
use sqlx::SqlitePool;
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

/// Chat between users holding an accepted connection.
#[derive(Clone)]
pub struct MessagingGate {
    pool: SqlitePool,
    ledger: ConnectionLedger,
    directory: UserDirectory,
    notifier: Arc<dyn Notifier>,
}

impl MessagingGate {
    pub fn new(pool: SqlitePool, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            ledger: ConnectionLedger::new(pool.clone()),
            directory: UserDirectory::new(pool.clone()),
            pool,
            notifier,
        }
    }

    /// Store a message and push it to the receiver's listeners.
    ///
    /// The connection is checked only at send time; delivery is best-effort and
    /// never fails the send once the message is stored.
    pub async fn send(&self, sender: Uuid, receiver: Uuid, content: &str) -> AppResult<MessageView> {
        if content.trim().is_empty() {
            return Err(AppError::InvalidArgument("Receiver and content are required".to_string()));
        }
        if self.ledger.are_connected(sender, receiver).await?.is_none() {
            return Err(AppError::NotConnected);
        }

        let message = messages::create_message(&self.pool, sender, receiver, content, Utc::now()).await?;
        let names = self.names(&[sender, receiver]).await?;
        let view = to_view(message, &names)?;

        tracing::info!("Message {} sent: {} -> {}", view.id, sender, receiver);
        self.notifier.notify(receiver, &view);

        Ok(view)
    }

    /// Full exchange with `counterpart`, oldest first. Requires an accepted connection now.
    pub async fn history(&self, viewer: Uuid, counterpart: Uuid) -> AppResult<Vec<MessageView>> {
        if self.ledger.are_connected(viewer, counterpart).await?.is_none() {
            return Err(AppError::NotConnected);
        }

        let history = messages::get_messages_between(&self.pool, viewer, counterpart).await?;
        let names = self.names(&[viewer, counterpart]).await?;

        history
            .into_iter()
            .map(|message| to_view(message, &names))
            .collect()
    }

    /// One entry per accepted connection of `viewer`, most recently active first.
    pub async fn conversations(&self, viewer: Uuid) -> AppResult<Vec<Conversation>> {
        let accepted = self.ledger.list_accepted(viewer).await?;
        let counterparts: Vec<Uuid> = accepted.iter().map(|c| c.counterpart(viewer)).collect();
        let people = self.directory.lookup(&counterparts).await?;

        let mut conversations = Vec::with_capacity(accepted.len());
        for connection in accepted {
            let other_id = connection.counterpart(viewer);
            let Some(other) = people.get(&other_id) else {
                tracing::warn!("Connection {} points at unknown user {}", connection.id, other_id);
                continue;
            };

            let latest_message = messages::get_latest_message_between(&self.pool, viewer, other_id)
                .await?
                .map(|message| LatestMessage {
                    is_own: message.sender == viewer,
                    content: message.content,
                    timestamp: message.sent_at,
                });

            conversations.push(Conversation {
                user_id: other.id,
                name: other.name.clone(),
                email: other.email.clone(),
                role: other.role,
                connection_id: connection.id,
                latest_message,
            });
        }

        conversations.sort_by(Conversation::by_recent_activity);
        Ok(conversations)
    }

    async fn names(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, UserName>> {
        let people = self.directory.lookup(user_ids).await?;
        Ok(people
            .iter()
            .map(|(id, user)| (*id, UserName::from(user)))
            .collect())
    }
}

fn to_view(message: Message, names: &HashMap<Uuid, UserName>) -> AppResult<MessageView> {
    let sender = names.get(&message.sender).cloned().ok_or(AppError::NotFound("User"))?;
    let receiver = names.get(&message.receiver).cloned().ok_or(AppError::NotFound("User"))?;

    Ok(MessageView {
        id: message.id,
        sender,
        receiver,
        content: message.content,
        timestamp: message.sent_at,
    })
}
