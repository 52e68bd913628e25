//! Job seeker domain service

use super::{
    entity::{JobSeeker, JobSeekerPatch},
    repository::JobSeekerStore,
};
use crate::error::{Result, StorageError};
use tracing::info;
use uuid::Uuid;

pub struct JobSeekerService {
    store: Box<dyn JobSeekerStore>,
}

impl JobSeekerService {
    pub fn new(store: Box<dyn JobSeekerStore>) -> Self {
        Self { store }
    }

    /// Get the underlying store
    pub fn store(&self) -> &dyn JobSeekerStore {
        self.store.as_ref()
    }

    /// Register a new job seeker
    ///
    /// Refuses an email that is already taken, and a caller-supplied id that
    /// already belongs to a stored job seeker.
    pub async fn register(&self, seeker: JobSeeker) -> Result<JobSeeker> {
        if !seeker.is_new() && self.store.exists_by_id(&seeker.id).await? {
            return Err(StorageError::Constraint(format!(
                "A job seeker with ID '{}' already exists",
                seeker.id
            )));
        }

        if self.store.exists_by_email(&seeker.email).await? {
            return Err(StorageError::Constraint(format!(
                "A job seeker with email '{}' is already registered",
                seeker.email
            )));
        }

        let saved = self.store.save(&seeker).await?;
        info!(id = %saved.id, "Registered job seeker");
        Ok(saved)
    }

    /// Get job seeker by ID
    pub async fn get(&self, id: Uuid) -> Result<Option<JobSeeker>> {
        self.store.find_by_id(&id).await
    }

    /// List all job seekers
    pub async fn list(&self) -> Result<Vec<JobSeeker>> {
        self.store.find_all().await
    }

    /// Apply a patch to an existing job seeker
    ///
    /// Returns `None` when the id is unknown. Changing the email to one held
    /// by another job seeker is refused.
    pub async fn update(&self, id: Uuid, patch: JobSeekerPatch) -> Result<Option<JobSeeker>> {
        let Some(mut seeker) = self.store.find_by_id(&id).await? else {
            return Ok(None);
        };

        if let Some(email) = &patch.email {
            let same_address = self.store.email_match().matches(&seeker.email, email);
            if !same_address && self.store.exists_by_email(email).await? {
                return Err(StorageError::Constraint(format!(
                    "A job seeker with email '{}' is already registered",
                    email
                )));
            }
        }

        seeker.apply(patch);
        self.store.save(&seeker).await.map(Some)
    }

    /// Remove a job seeker. Returns whether anything was there.
    pub async fn remove(&self, id: Uuid) -> Result<bool> {
        let existed = self.store.exists_by_id(&id).await?;
        self.store.delete_by_id(&id).await?;
        Ok(existed)
    }
}
