use crate::{
    db::users,
    error::{AppError, AppResult, is_unique_violation},
    models::{NewUser, User},
};
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

/// Identity lookups used to validate actors and decorate results.
#[derive(Debug, Clone)]
pub struct UserDirectory {
    pool: SqlitePool,
}

impl UserDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn register(&self, new_user: NewUser) -> AppResult<User> {
        if new_user.name.trim().is_empty() || new_user.email.trim().is_empty() {
            return Err(AppError::InvalidArgument("Name and email are required".to_string()));
        }
        if !new_user.email.contains('@') {
            return Err(AppError::InvalidArgument("Email address is not valid".to_string()));
        }
        if new_user.industry_experience < 0 {
            return Err(AppError::InvalidArgument("Industry experience cannot be negative".to_string()));
        }

        match users::create_user(&self.pool, &new_user).await {
            Ok(user) => {
                tracing::info!("Registered user {} ({})", user.id, user.email);
                Ok(user)
            }
            Err(e) if is_unique_violation(&e) => Err(AppError::AlreadyExists("User")),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get(&self, user_id: Uuid) -> AppResult<User> {
        users::get_user_by_id(&self.pool, user_id)
            .await?
            .ok_or(AppError::NotFound("User"))
    }

    /// Everyone except `viewer`, sorted by name.
    pub async fn list_others(&self, viewer: Uuid) -> AppResult<Vec<User>> {
        Ok(users::list_users_except(&self.pool, viewer).await?)
    }

    /// Users keyed by id; unknown ids are absent from the map.
    pub async fn lookup(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, User>> {
        let mut ids = user_ids.to_vec();
        ids.sort();
        ids.dedup();

        let found = users::get_users_by_ids(&self.pool, &ids).await?;
        Ok(found.into_iter().map(|user| (user.id, user)).collect())
    }
}
