//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: the pool wrapper all reads and writes go through

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{ConfigEntry, Group, Site};
pub use schema::SQLITE_INIT;
pub use sqlite::{NavStore, SqlitePool};
