//! Infrastructure layer - concrete job seeker stores

pub mod in_memory_job_seeker_store;
pub mod sqlite_job_seeker_store;

pub use in_memory_job_seeker_store::InMemoryJobSeekerStore;
pub use sqlite_job_seeker_store::SqliteJobSeekerStore;
