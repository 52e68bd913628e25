//! Job seeker entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered job seeker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSeeker {
    /// Unique identifier. Nil until assigned by the caller or the store.
    pub id: Uuid,
    /// Contact email address
    pub email: String,
    /// Full name as entered at registration
    pub full_name: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub phone_number: Option<String>,
    /// When the job seeker was first stored
    pub created_at: DateTime<Utc>,
    /// When the job seeker was last modified
    pub updated_at: DateTime<Utc>,
}

/// Partial update of a job seeker's mutable fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSeekerPatch {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub phone_number: Option<String>,
}

impl JobSeekerPatch {
    /// Whether applying this patch would change nothing
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.full_name.is_none()
            && self.country.is_none()
            && self.city.is_none()
            && self.phone_number.is_none()
    }
}

impl JobSeeker {
    /// Create a job seeker that has not been assigned an identifier yet
    pub fn new(email: impl Into<String>, full_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::nil(),
            email: email.into(),
            full_name: full_name.into(),
            country: None,
            city: None,
            phone_number: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set a caller-chosen identifier
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    /// Whether the entity still needs an identifier
    pub fn is_new(&self) -> bool {
        self.id.is_nil()
    }

    /// Apply a patch and bump `updated_at`. The identifier never changes.
    pub fn apply(&mut self, patch: JobSeekerPatch) {
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(full_name) = patch.full_name {
            self.full_name = full_name;
        }
        if let Some(country) = patch.country {
            self.country = Some(country);
        }
        if let Some(city) = patch.city {
            self.city = Some(city);
        }
        if let Some(phone_number) = patch.phone_number {
            self.phone_number = Some(phone_number);
        }
        self.updated_at = Utc::now();
    }
}
