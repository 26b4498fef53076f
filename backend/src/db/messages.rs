use crate::models::Message;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

const MESSAGE_COLUMNS: &str = "seq, id, sender, receiver, content, sent_at";

pub async fn create_message(
    pool: &SqlitePool,
    sender: Uuid,
    receiver: Uuid,
    content: &str,
    sent_at: DateTime<Utc>,
) -> Result<Message, sqlx::Error> {
    sqlx::query_as::<_, Message>(&format!(
        r#"
        INSERT INTO messages (id, sender, receiver, content, sent_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {MESSAGE_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(sender)
    .bind(receiver)
    .bind(content)
    .bind(sent_at)
    .fetch_one(pool)
    .await
}

/// Every message exchanged between `a` and `b`, in either direction, oldest first.
pub async fn get_messages_between(pool: &SqlitePool, a: Uuid, b: Uuid) -> Result<Vec<Message>, sqlx::Error> {
    let mut messages = sqlx::query_as::<_, Message>(&format!(
        r#"
        SELECT {MESSAGE_COLUMNS} FROM messages
        WHERE (sender = $1 AND receiver = $2) OR (sender = $2 AND receiver = $1)
        ORDER BY seq ASC
        "#
    ))
    .bind(a)
    .bind(b)
    .fetch_all(pool)
    .await?;

    messages.sort_by(Message::chronological);
    Ok(messages)
}

/// The most recent message between `a` and `b`, if any.
pub async fn get_latest_message_between(pool: &SqlitePool, a: Uuid, b: Uuid) -> Result<Option<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(&format!(
        r#"
        SELECT {MESSAGE_COLUMNS} FROM messages
        WHERE (sender = $1 AND receiver = $2) OR (sender = $2 AND receiver = $1)
        ORDER BY sent_at DESC, seq DESC
        LIMIT 1
        "#
    ))
    .bind(a)
    .bind(b)
    .fetch_optional(pool)
    .await
}
