//! Store policies for identifiers and email matching

use crate::error::{Result, StorageError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who is responsible for producing the identifier of a new job seeker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// The store generates a random v4 UUID for entities saved with a nil id
    #[default]
    Store,
    /// The caller must supply the id; a nil id is rejected
    Client,
}

impl IdStrategy {
    /// Convert to string for configuration storage
    pub fn as_str(&self) -> &'static str {
        match self {
            IdStrategy::Store => "store",
            IdStrategy::Client => "client",
        }
    }

    /// Parse from configuration string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "store" => Some(IdStrategy::Store),
            "client" => Some(IdStrategy::Client),
            _ => None,
        }
    }

    /// Resolve the identifier a save should use
    pub fn resolve(&self, id: Uuid) -> Result<Uuid> {
        if !id.is_nil() {
            return Ok(id);
        }
        match self {
            IdStrategy::Store => Ok(Uuid::new_v4()),
            IdStrategy::Client => Err(StorageError::MissingIdentifier),
        }
    }
}

/// How `exists_by_email` compares the stored email with the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailMatch {
    /// Byte-for-byte equality, no case or whitespace folding
    #[default]
    Exact,
    /// ASCII case folding (SQLite `NOCASE`)
    CaseInsensitive,
}

impl EmailMatch {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailMatch::Exact => "exact",
            EmailMatch::CaseInsensitive => "case_insensitive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "exact" => Some(EmailMatch::Exact),
            "case_insensitive" => Some(EmailMatch::CaseInsensitive),
            _ => None,
        }
    }

    /// Compare a stored email against a queried one
    pub fn matches(&self, stored: &str, query: &str) -> bool {
        match self {
            EmailMatch::Exact => stored == query,
            EmailMatch::CaseInsensitive => stored.eq_ignore_ascii_case(query),
        }
    }
}
