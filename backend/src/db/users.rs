use crate::models::{NewUser, User};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, name, email, role, domain, industry_experience, created_at";

pub async fn create_user(pool: &SqlitePool, new_user: &NewUser) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (id, name, email, role, domain, industry_experience, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(new_user.name.trim())
    .bind(new_user.email.trim().to_lowercase())
    .bind(new_user.role)
    .bind(new_user.domain.as_deref())
    .bind(new_user.industry_experience)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

pub async fn get_user_by_id(pool: &SqlitePool, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Fetch several users at once; missing ids are silently skipped.
pub async fn get_users_by_ids(pool: &SqlitePool, user_ids: &[Uuid]) -> Result<Vec<User>, sqlx::Error> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = (1..=user_ids.len())
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id IN ({placeholders})");

    let mut query = sqlx::query_as::<_, User>(&sql);
    for id in user_ids {
        query = query.bind(*id);
    }
    query.fetch_all(pool).await
}

pub async fn list_users_except(pool: &SqlitePool, excluded: Uuid) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id <> $1 ORDER BY name ASC"
    ))
    .bind(excluded)
    .fetch_all(pool)
    .await
}

pub async fn list_all_users(pool: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY name ASC"))
        .fetch_all(pool)
        .await
}
