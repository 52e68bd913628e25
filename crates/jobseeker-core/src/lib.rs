//! Jobseeker Core Library
//!
//! Persistence for job seeker records:
//! - Domain (job seeker entity, generic `Repository` trait, `JobSeekerStore`)
//! - Infrastructure (SQLite and in-memory stores)
//! - Storage (SQLite connection pool + schema migrations)
//! - Configuration (TOML file under the user config directory)

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod storage;

pub use domain::*;
pub use error::{Result, StorageError};
pub use infrastructure::{InMemoryJobSeekerStore, SqliteJobSeekerStore};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::{JobSeeker, JobSeekerStore, Repository};
    pub use crate::error::{Result, StorageError};
    pub use crate::infrastructure::SqliteJobSeekerStore;
    pub use crate::storage::Database;
}
