//! Job seeker store trait

use super::entity::JobSeeker;
use super::value_object::EmailMatch;
use crate::domain::repository::Repository;
use crate::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Persistence for job seekers: the generic CRUD capability plus the
/// derived lookup by email.
#[async_trait]
pub trait JobSeekerStore: Repository<JobSeeker, Uuid> {
    /// Check whether at least one stored job seeker has this email
    ///
    /// Comparison follows the store's [`EmailMatch`] policy.
    async fn exists_by_email(&self, email: &str) -> Result<bool>;

    /// Policy used by `exists_by_email`
    fn email_match(&self) -> EmailMatch;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify trait is object-safe
    fn _assert_object_safe(_: &dyn JobSeekerStore) {}
}
