use crate::error::{ApiError, ApiResult};
use auth_identity::UserId;
use entity_store::{Animal, AnimalId, EntityStore, Owned, Zoo, ZooId};
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

/// Ownership check applied to every read and write of an entity
///
/// # Errors
///
/// `ApiError::Authorization` (403) when the caller is not the owner.
pub fn authorize<E: Owned>(entity: &E, caller: &UserId) -> ApiResult<()> {
    if entity.owner() == caller {
        return Ok(());
    }
    warn!(
        entity = %entity.self_link(),
        caller = %caller,
        "Ownership check failed"
    );
    Err(ApiError::authorization(format!(
        "this {} belongs to another user",
        E::KIND
    )))
}

/// Parses a path id; anything that is not a UUID names no entity
///
/// # Errors
///
/// `ApiError::NotFound` for malformed ids.
pub fn parse_id<T: FromStr>(kind: &str, raw: &str) -> ApiResult<T> {
    raw.parse().map_err(|_| ApiError::not_found(kind, raw))
}

/// Loads entities and runs [`authorize`] on them
#[derive(Clone)]
pub struct AccessGuard {
    store: Arc<dyn EntityStore>,
}

impl AccessGuard {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// NotFound when absent, Authorization when owned by someone else.
    pub async fn animal(&self, caller: &UserId, id: AnimalId) -> ApiResult<Animal> {
        let animal = self
            .store
            .get_animal(id)
            .await?
            .ok_or_else(|| ApiError::not_found("animal", id.to_string()))?;
        authorize(&animal, caller)?;
        Ok(animal)
    }

    /// # Errors
    ///
    /// NotFound when absent, Authorization when owned by someone else.
    pub async fn zoo(&self, caller: &UserId, id: ZooId) -> ApiResult<Zoo> {
        let zoo = self
            .store
            .get_zoo(id)
            .await?
            .ok_or_else(|| ApiError::not_found("zoo", id.to_string()))?;
        authorize(&zoo, caller)?;
        Ok(zoo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use entity_store::{InMemoryEntityStore, WriteBatch};

    #[test]
    fn owner_passes_and_stranger_is_forbidden() {
        let lion = Animal::new(UserId::new("alice"), "Lion");
        assert!(authorize(&lion, &UserId::new("alice")).is_ok());

        let error = authorize(&lion, &UserId::new("bob")).unwrap_err();
        assert_eq!(error.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn malformed_ids_are_not_found() {
        let error = parse_id::<AnimalId>("animal", "not-a-uuid").unwrap_err();
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert!(parse_id::<ZooId>("zoo", &ZooId::generate().to_string()).is_ok());
    }

    #[tokio::test]
    async fn guard_distinguishes_missing_from_foreign() {
        let store = Arc::new(InMemoryEntityStore::new());
        let zoo = Zoo::new(UserId::new("alice"), "City Zoo");
        let id = zoo.id;
        let mut batch = WriteBatch::new();
        batch.insert_zoo(zoo);
        store.commit(batch).await.unwrap();

        let guard = AccessGuard::new(store);
        assert!(guard.zoo(&UserId::new("alice"), id).await.is_ok());

        let foreign = guard.zoo(&UserId::new("bob"), id).await.unwrap_err();
        assert_eq!(foreign.status_code(), StatusCode::FORBIDDEN);

        let missing = guard
            .zoo(&UserId::new("alice"), ZooId::generate())
            .await
            .unwrap_err();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }
}
