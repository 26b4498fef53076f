use crate::models::{Connection, ConnectionStatus, canonical_pair};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

const CONNECTION_COLUMNS: &str = "id, from_user, to_user, status, created_at";

/// Insert a pending request. Fails with a unique violation when the pair already has a record.
pub async fn create_pending_connection(
    pool: &SqlitePool,
    from_user: Uuid,
    to_user: Uuid,
    created_at: DateTime<Utc>,
) -> Result<Connection, sqlx::Error> {
    let (user_low, user_high) = canonical_pair(from_user, to_user);

    sqlx::query_as::<_, Connection>(&format!(
        r#"
        INSERT INTO connections (id, from_user, to_user, user_low, user_high, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {CONNECTION_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(from_user)
    .bind(to_user)
    .bind(user_low)
    .bind(user_high)
    .bind(ConnectionStatus::Pending)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub async fn get_connection_by_id(pool: &SqlitePool, connection_id: Uuid) -> Result<Option<Connection>, sqlx::Error> {
    sqlx::query_as::<_, Connection>(&format!(
        "SELECT {CONNECTION_COLUMNS} FROM connections WHERE id = $1"
    ))
    .bind(connection_id)
    .fetch_optional(pool)
    .await
}

/// The record for the unordered pair {a, b}, whatever its direction or status.
pub async fn get_connection_between(pool: &SqlitePool, a: Uuid, b: Uuid) -> Result<Option<Connection>, sqlx::Error> {
    let (user_low, user_high) = canonical_pair(a, b);

    sqlx::query_as::<_, Connection>(&format!(
        "SELECT {CONNECTION_COLUMNS} FROM connections WHERE user_low = $1 AND user_high = $2"
    ))
    .bind(user_low)
    .bind(user_high)
    .fetch_optional(pool)
    .await
}

pub async fn get_accepted_connection_between(
    pool: &SqlitePool,
    a: Uuid,
    b: Uuid,
) -> Result<Option<Connection>, sqlx::Error> {
    let (user_low, user_high) = canonical_pair(a, b);

    sqlx::query_as::<_, Connection>(&format!(
        r#"
        SELECT {CONNECTION_COLUMNS} FROM connections
        WHERE user_low = $1 AND user_high = $2 AND status = $3
        "#
    ))
    .bind(user_low)
    .bind(user_high)
    .bind(ConnectionStatus::Accepted)
    .fetch_optional(pool)
    .await
}

/// Move a record from `from_status` to `to_status`. Returns `None` if the record
/// was not in `from_status` at write time.
pub async fn transition_status(
    pool: &SqlitePool,
    connection_id: Uuid,
    from_status: ConnectionStatus,
    to_status: ConnectionStatus,
) -> Result<Option<Connection>, sqlx::Error> {
    sqlx::query_as::<_, Connection>(&format!(
        r#"
        UPDATE connections
        SET status = $1
        WHERE id = $2 AND status = $3
        RETURNING {CONNECTION_COLUMNS}
        "#
    ))
    .bind(to_status)
    .bind(connection_id)
    .bind(from_status)
    .fetch_optional(pool)
    .await
}

/// Turn a rejected record back into a pending request from `from_user` to `to_user`,
/// keeping its id. Returns `None` if the record is no longer rejected.
pub async fn reopen_rejected_connection(
    pool: &SqlitePool,
    connection_id: Uuid,
    from_user: Uuid,
    to_user: Uuid,
    created_at: DateTime<Utc>,
) -> Result<Option<Connection>, sqlx::Error> {
    sqlx::query_as::<_, Connection>(&format!(
        r#"
        UPDATE connections
        SET from_user = $1, to_user = $2, status = $3, created_at = $4
        WHERE id = $5 AND status = $6
        RETURNING {CONNECTION_COLUMNS}
        "#
    ))
    .bind(from_user)
    .bind(to_user)
    .bind(ConnectionStatus::Pending)
    .bind(created_at)
    .bind(connection_id)
    .bind(ConnectionStatus::Rejected)
    .fetch_optional(pool)
    .await
}

/// Delete a record only while it still has `status`. Returns whether a row was removed.
pub async fn delete_connection_with_status(
    pool: &SqlitePool,
    connection_id: Uuid,
    status: ConnectionStatus,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM connections WHERE id = $1 AND status = $2")
        .bind(connection_id)
        .bind(status)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Pending requests addressed to `user_id`, oldest first.
pub async fn get_incoming_pending(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Connection>, sqlx::Error> {
    sqlx::query_as::<_, Connection>(&format!(
        r#"
        SELECT {CONNECTION_COLUMNS} FROM connections
        WHERE to_user = $1 AND status = $2
        ORDER BY created_at ASC
        "#
    ))
    .bind(user_id)
    .bind(ConnectionStatus::Pending)
    .fetch_all(pool)
    .await
}

/// Pending requests sent by `user_id`, oldest first.
pub async fn get_outgoing_pending(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Connection>, sqlx::Error> {
    sqlx::query_as::<_, Connection>(&format!(
        r#"
        SELECT {CONNECTION_COLUMNS} FROM connections
        WHERE from_user = $1 AND status = $2
        ORDER BY created_at ASC
        "#
    ))
    .bind(user_id)
    .bind(ConnectionStatus::Pending)
    .fetch_all(pool)
    .await
}

/// Accepted connections where `user_id` is either party.
pub async fn get_accepted_for_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Connection>, sqlx::Error> {
    sqlx::query_as::<_, Connection>(&format!(
        r#"
        SELECT {CONNECTION_COLUMNS} FROM connections
        WHERE status = $1 AND (from_user = $2 OR to_user = $2)
        ORDER BY created_at ASC
        "#
    ))
    .bind(ConnectionStatus::Accepted)
    .bind(user_id)
    .fetch_all(pool)
    .await
}
