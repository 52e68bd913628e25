//! Storage layer - SQLite connection pool and schema migrations
//!
//! # Usage
//!
//! ```ignore
//! use jobseeker_core::storage::{Database, DatabaseConfig};
//!
//! // In-memory database for tests
//! let db = Database::in_memory().await?;
//!
//! // File-backed database, migrated on open
//! let db = Database::new(DatabaseConfig::with_path("seekers.db")).await?;
//! ```

pub mod database;
pub mod migrations;

pub use database::{Database, DatabaseConfig, default_database_path};
pub use migrations::{CURRENT_VERSION, MigrationStatus, migration_status, run_migrations};
