use async_trait::async_trait;

use crate::batch::{Committed, WriteBatch};
use crate::error::StoreResult;
use crate::models::{Animal, AnimalId, Zoo, ZooId};
use crate::query::{AnimalQuery, ZooQuery};

/// Storage backend for animals and zoos.
///
/// Reads return the latest committed state. All writes go through
/// [`EntityStore::commit`], which applies a batch completely or not at all.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Short backend name for health reporting
    fn backend(&self) -> &'static str;

    async fn get_animal(&self, id: AnimalId) -> StoreResult<Option<Animal>>;

    async fn get_zoo(&self, id: ZooId) -> StoreResult<Option<Zoo>>;

    /// Matching animals ordered by creation time
    async fn query_animals(&self, query: &AnimalQuery) -> StoreResult<Vec<Animal>>;

    /// Matching zoos ordered by creation time
    async fn query_zoos(&self, query: &ZooQuery) -> StoreResult<Vec<Zoo>>;

    /// Apply every operation of the batch atomically.
    ///
    /// # Errors
    ///
    /// - [`crate::StoreError::InvalidBatch`] if an entity appears twice
    /// - [`crate::StoreError::Conflict`] on a stale revision or duplicate insert
    /// - [`crate::StoreError::NotFound`] if a put or delete targets a missing record
    /// - [`crate::StoreError::Constraint`] if the result would break the relationship rules
    async fn commit(&self, batch: WriteBatch) -> StoreResult<Committed>;

    /// Remove every animal and zoo
    async fn wipe(&self) -> StoreResult<()>;
}
