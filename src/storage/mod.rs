//! SQLite store and backup archive codec

pub mod codec;
pub mod db;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool};
