pub mod connection;
pub mod connections;
pub mod messages;
pub mod migrations;
pub mod users;

pub use connection::{get_db_pool, get_memory_pool, DatabaseConfig};
