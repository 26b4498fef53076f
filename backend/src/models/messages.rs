use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use uuid::Uuid;

use super::users::{UserName, UserRole};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Insertion sequence, tie-break for equal timestamps.
    #[serde(skip)]
    pub seq: i64,
    pub id: Uuid,
    pub sender: Uuid,
    pub receiver: Uuid,
    pub content: String,
    #[serde(rename = "timestamp")]
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// Chronological order: timestamp first, then insertion sequence.
    pub fn chronological(a: &Message, b: &Message) -> Ordering {
        a.sent_at.cmp(&b.sent_at).then(a.seq.cmp(&b.seq))
    }
}

/// Message with sender and receiver expanded for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: Uuid,
    pub sender: UserName,
    pub receiver: UserName,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestMessage {
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_own: bool,
}

/// Derived view: one connected counterparty and the last message exchanged.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub connection_id: Uuid,
    pub latest_message: Option<LatestMessage>,
}

impl Conversation {
    /// Most recent activity first; conversations without messages go last.
    pub fn by_recent_activity(a: &Conversation, b: &Conversation) -> Ordering {
        match (&a.latest_message, &b.latest_message) {
            (Some(x), Some(y)) => y.timestamp.cmp(&x.timestamp),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn conversation(name: &str, latest: Option<DateTime<Utc>>) -> Conversation {
        Conversation {
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name),
            role: UserRole::Junior,
            connection_id: Uuid::new_v4(),
            latest_message: latest.map(|timestamp| LatestMessage {
                content: "hi".to_string(),
                timestamp,
                is_own: false,
            }),
        }
    }

    #[test]
    fn conversations_sort_newest_first_and_silent_last() {
        let now = Utc::now();
        let mut list = vec![
            conversation("silent", None),
            conversation("old", Some(now - Duration::minutes(5))),
            conversation("new", Some(now)),
        ];
        list.sort_by(Conversation::by_recent_activity);
        let names: Vec<_> = list.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["new", "old", "silent"]);
    }

    #[test]
    fn equal_timestamps_fall_back_to_insertion_order() {
        let now = Utc::now();
        let make = |seq: i64| Message {
            seq,
            id: Uuid::new_v4(),
            sender: Uuid::nil(),
            receiver: Uuid::nil(),
            content: seq.to_string(),
            sent_at: now,
        };
        let mut messages = vec![make(3), make(1), make(2)];
        messages.sort_by(Message::chronological);
        let order: Vec<_> = messages.iter().map(|m| m.seq).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }
}
