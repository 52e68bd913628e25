//! Generic repository trait
//!
//! The base persistence capability every entity store provides. Entity
//! specific stores extend it with their own derived queries.

use crate::error::Result;
use async_trait::async_trait;

/// CRUD access to entities of type `E` keyed by `K`
#[async_trait]
pub trait Repository<E, K>: Send + Sync
where
    E: Send + Sync,
    K: Send + Sync,
{
    /// Insert or update an entity, returning what was persisted
    ///
    /// A newly created entity comes back with its identifier populated.
    async fn save(&self, entity: &E) -> Result<E>;

    /// Get an entity by identifier
    async fn find_by_id(&self, id: &K) -> Result<Option<E>>;

    /// List all entities, in no particular order
    async fn find_all(&self) -> Result<Vec<E>>;

    /// Delete an entity by identifier. Deleting an absent id is not an error.
    async fn delete_by_id(&self, id: &K) -> Result<()>;

    /// Check if an entity with the given identifier exists
    async fn exists_by_id(&self, id: &K) -> Result<bool>;

    /// Count stored entities
    async fn count(&self) -> Result<u64>;
}
