//! Domain layer - entities, store traits, and services

pub mod job_seeker;
pub mod repository;

pub use job_seeker::{
    EmailMatch, IdStrategy, JobSeeker, JobSeekerPatch, JobSeekerService, JobSeekerStore,
};
pub use repository::Repository;
