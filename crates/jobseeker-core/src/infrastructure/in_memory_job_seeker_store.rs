//! In-memory job seeker store
//!
//! Keeps job seekers in a map behind a mutex. Nothing survives the process;
//! intended for tests and for callers that do not need a database.

use crate::domain::{EmailMatch, IdStrategy, JobSeeker, JobSeekerStore, Repository};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct InMemoryJobSeekerStore {
    seekers: Mutex<HashMap<Uuid, JobSeeker>>,
    id_strategy: IdStrategy,
    email_match: EmailMatch,
}

impl InMemoryJobSeekerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    pub fn with_email_match(mut self, email_match: EmailMatch) -> Self {
        self.email_match = email_match;
        self
    }

    fn seekers(&self) -> MutexGuard<'_, HashMap<Uuid, JobSeeker>> {
        self.seekers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Repository<JobSeeker, Uuid> for InMemoryJobSeekerStore {
    async fn save(&self, entity: &JobSeeker) -> Result<JobSeeker> {
        let id = self.id_strategy.resolve(entity.id)?;
        let mut seekers = self.seekers();

        let mut stored = entity.clone();
        stored.id = id;
        if let Some(existing) = seekers.get(&id) {
            stored.created_at = existing.created_at;
        }

        seekers.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<JobSeeker>> {
        Ok(self.seekers().get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<JobSeeker>> {
        Ok(self.seekers().values().cloned().collect())
    }

    async fn delete_by_id(&self, id: &Uuid) -> Result<()> {
        self.seekers().remove(id);
        Ok(())
    }

    async fn exists_by_id(&self, id: &Uuid) -> Result<bool> {
        Ok(self.seekers().contains_key(id))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.seekers().len() as u64)
    }
}

#[async_trait]
impl JobSeekerStore for InMemoryJobSeekerStore {
    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        Ok(self
            .seekers()
            .values()
            .any(|s| self.email_match.matches(&s.email, email)))
    }

    fn email_match(&self) -> EmailMatch {
        self.email_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;

    #[tokio::test]
    async fn test_in_memory_store_crud() {
        let store = InMemoryJobSeekerStore::new();

        // Create
        let saved = store
            .save(&JobSeeker::new("ada@example.com", "Ada Lovelace"))
            .await
            .unwrap();
        assert!(!saved.is_new());

        // Read
        let found = store.find_by_id(&saved.id).await.unwrap();
        assert_eq!(found.as_ref(), Some(&saved));

        // Exists
        assert!(store.exists_by_email("ada@example.com").await.unwrap());
        assert!(!store.exists_by_email("ADA@example.com").await.unwrap());
        assert!(store.exists_by_id(&saved.id).await.unwrap());

        // Update
        let mut updated = saved.clone();
        updated.full_name = "Augusta Ada King".to_string();
        store.save(&updated).await.unwrap();
        assert_eq!(
            store.find_by_id(&saved.id).await.unwrap().unwrap().full_name,
            "Augusta Ada King"
        );
        assert_eq!(store.count().await.unwrap(), 1);

        // Delete
        store.delete_by_id(&saved.id).await.unwrap();
        assert!(store.find_by_id(&saved.id).await.unwrap().is_none());
        store.delete_by_id(&saved.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_in_memory_case_insensitive() {
        let store = InMemoryJobSeekerStore::new().with_email_match(EmailMatch::CaseInsensitive);
        store
            .save(&JobSeeker::new("a@b.com", "A"))
            .await
            .unwrap();

        assert!(store.exists_by_email("A@B.COM").await.unwrap());
    }

    #[tokio::test]
    async fn test_in_memory_client_ids() {
        let store = InMemoryJobSeekerStore::new().with_id_strategy(IdStrategy::Client);

        let err = store
            .save(&JobSeeker::new("a@b.com", "A"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::MissingIdentifier));

        let id = Uuid::new_v4();
        let saved = store
            .save(&JobSeeker::new("a@b.com", "A").with_id(id))
            .await
            .unwrap();
        assert_eq!(saved.id, id);
    }

    #[tokio::test]
    async fn test_in_memory_preserves_created_at() {
        let store = InMemoryJobSeekerStore::new();
        let saved = store
            .save(&JobSeeker::new("a@b.com", "A"))
            .await
            .unwrap();

        let mut changed = saved.clone();
        changed.created_at = saved.created_at + chrono::Duration::days(3);
        let resaved = store.save(&changed).await.unwrap();

        assert_eq!(resaved.created_at, saved.created_at);
    }
}
