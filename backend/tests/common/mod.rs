#![allow(dead_code)]

use prepconnect::{
    db::{get_memory_pool, migrations},
    models::{MessageView, NewUser, User, UserRole},
    services::{Notifier, UserDirectory},
};
use sqlx::SqlitePool;
use std::sync::Mutex;
use uuid::Uuid;

/// Fresh in-memory database with the schema applied.
pub async fn setup_test_db() -> SqlitePool {
    let pool = get_memory_pool().await.unwrap();
    migrations::run_migrations(&pool).await.unwrap();
    pool
}

pub async fn create_user(pool: &SqlitePool, name: &str) -> User {
    UserDirectory::new(pool.clone())
        .register(NewUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role: UserRole::Junior,
            domain: None,
            industry_experience: 0,
        })
        .await
        .unwrap()
}

/// Captures every notification instead of delivering it.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(Uuid, MessageView)>>,
}

impl RecordingNotifier {
    pub fn recipients(&self) -> Vec<Uuid> {
        self.sent.lock().unwrap().iter().map(|(user, _)| *user).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, user_id: Uuid, message: &MessageView) {
        self.sent.lock().unwrap().push((user_id, message.clone()));
    }
}
