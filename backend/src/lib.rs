pub mod models;
pub mod db;
pub mod error;
pub mod services;
pub mod handlers;
pub mod utils;
pub mod constants;

pub use utils::config::Config;
pub use db::connection::get_db_pool;
pub use error::{AppError, AppResult};
pub use handlers::{AppState, router};

// Re-export common types
pub use sqlx::SqlitePool;
pub use uuid::Uuid;
pub use chrono::{DateTime, Utc};
