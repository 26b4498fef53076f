use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::users::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Accepted => "accepted",
            ConnectionStatus::Rejected => "rejected",
        }
    }
}

/// Outcome a recipient can choose for a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespondAction {
    Accepted,
    Rejected,
}

impl std::str::FromStr for RespondAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accepted" | "accept" => Ok(RespondAction::Accepted),
            "rejected" | "reject" => Ok(RespondAction::Rejected),
            _ => Err(()),
        }
    }
}

impl From<RespondAction> for ConnectionStatus {
    fn from(action: RespondAction) -> Self {
        match action {
            RespondAction::Accepted => ConnectionStatus::Accepted,
            RespondAction::Rejected => ConnectionStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
}

impl Connection {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.from_user == user_id || self.to_user == user_id
    }

    /// The party that is not `user_id`.
    pub fn counterpart(&self, user_id: Uuid) -> Uuid {
        if self.from_user == user_id {
            self.to_user
        } else {
            self.from_user
        }
    }
}

/// Connection with both parties expanded for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionView {
    pub id: Uuid,
    pub from_user: UserSummary,
    pub to_user: UserSummary,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
}

/// Pairwise relationship as seen by one of the two users.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatusReport {
    /// `none` when no record exists for the pair.
    pub status: String,
    pub connection: Option<Connection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_initiator: Option<bool>,
}

impl ConnectionStatusReport {
    pub fn none() -> Self {
        Self {
            status: "none".to_string(),
            connection: None,
            is_initiator: None,
        }
    }

    pub fn for_viewer(connection: Connection, viewer: Uuid) -> Self {
        Self {
            status: connection.status.as_str().to_string(),
            is_initiator: Some(connection.from_user == viewer),
            connection: Some(connection),
        }
    }
}

/// Sorted form of an unordered user pair, used as the uniqueness key.
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b { (a, b) } else { (b, a) }
}
