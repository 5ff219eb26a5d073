use crate::error::{ApiError, ApiResult};
use crate::services::{AccessGuard, RelationshipService, ZooOutcome};
use crate::types::ZooPayload;
use crate::validation::{non_blank, RequestValidation};
use auth_identity::UserId;
use entity_store::{Animal, AnimalId, EntityStore, Zoo, ZooId, ZooQuery};
use std::sync::Arc;
use tracing::warn;

/// Zoo operations for the calling user, including species-list links
#[derive(Clone)]
pub struct ZooService {
    store: Arc<dyn EntityStore>,
    guard: AccessGuard,
    relationships: RelationshipService,
}

impl ZooService {
    pub fn new(store: Arc<dyn EntityStore>, guard: AccessGuard, relationships: RelationshipService) -> Self {
        Self {
            store,
            guard,
            relationships,
        }
    }

    /// Creates a zoo owned by `caller`, linking whatever `species_list` resolves to
    ///
    /// # Errors
    ///
    /// Validation when `name` is missing.
    pub async fn create(&self, caller: &UserId, payload: ZooPayload) -> ApiResult<ZooOutcome> {
        payload.validate()?;
        let mut zoo = Zoo::new(caller.clone(), non_blank(payload.name.as_deref()).unwrap_or_default());
        zoo.city = non_blank(payload.city.as_deref());
        zoo.state = non_blank(payload.state.as_deref());
        zoo.size = non_blank(payload.size.as_deref());
        zoo.admission = payload.admission;

        let items = payload.species_list.unwrap_or_default();
        self.relationships.create_zoo(caller, zoo, &items).await
    }

    /// # Errors
    ///
    /// NotFound or Authorization from the guard.
    pub async fn get(&self, caller: &UserId, id: ZooId) -> ApiResult<Zoo> {
        self.guard.zoo(caller, id).await
    }

    /// # Errors
    ///
    /// Store failures.
    pub async fn list(&self, caller: &UserId) -> ApiResult<Vec<Zoo>> {
        Ok(self.store.query_zoos(&ZooQuery::owned_by(caller.clone())).await?)
    }

    /// The zoo's animals in species-list order
    ///
    /// # Errors
    ///
    /// NotFound or Authorization for the zoo.
    pub async fn animals(&self, caller: &UserId, id: ZooId) -> ApiResult<Vec<Animal>> {
        let zoo = self.guard.zoo(caller, id).await?;
        let mut animals = Vec::with_capacity(zoo.animals.len());
        for animal_id in &zoo.animals {
            match self.store.get_animal(*animal_id).await? {
                Some(animal) => animals.push(animal),
                None => warn!(zoo = %zoo.id, animal = %animal_id, "Skipping dangling species-list entry"),
            }
        }
        Ok(animals)
    }

    /// One animal of the zoo's species-list
    ///
    /// # Errors
    ///
    /// NotFound when the zoo does not list the animal.
    pub async fn animal(&self, caller: &UserId, zoo_id: ZooId, animal_id: AnimalId) -> ApiResult<Animal> {
        let zoo = self.guard.zoo(caller, zoo_id).await?;
        let animal = self.guard.animal(caller, animal_id).await?;
        if !zoo.lists(animal.id) {
            return Err(ApiError::not_found(
                "animal",
                format!("{animal_id} in zoo {zoo_id}"),
            ));
        }
        Ok(animal)
    }

    /// Full replace; a missing `species_list` empties the zoo
    ///
    /// # Errors
    ///
    /// Validation when `name` is missing, Conflict on a concurrent change.
    pub async fn replace(&self, caller: &UserId, id: ZooId, payload: ZooPayload) -> ApiResult<ZooOutcome> {
        payload.validate()?;
        let mut zoo = self.guard.zoo(caller, id).await?;
        if let Some(name) = non_blank(payload.name.as_deref()) {
            zoo.name = name;
        }
        zoo.city = non_blank(payload.city.as_deref());
        zoo.state = non_blank(payload.state.as_deref());
        zoo.size = non_blank(payload.size.as_deref());
        zoo.admission = payload.admission;

        let items = payload.species_list.unwrap_or_default();
        self.relationships.update_zoo(caller, zoo, Some(&items)).await
    }

    /// Partial update; the species-list is only replaced when present
    ///
    /// # Errors
    ///
    /// Validation for a blank name, Conflict on a concurrent change.
    pub async fn patch(&self, caller: &UserId, id: ZooId, payload: ZooPayload) -> ApiResult<ZooOutcome> {
        payload.validate_partial()?;
        let mut zoo = self.guard.zoo(caller, id).await?;
        if let Some(name) = non_blank(payload.name.as_deref()) {
            zoo.name = name;
        }
        if let Some(city) = non_blank(payload.city.as_deref()) {
            zoo.city = Some(city);
        }
        if let Some(state) = non_blank(payload.state.as_deref()) {
            zoo.state = Some(state);
        }
        if let Some(size) = non_blank(payload.size.as_deref()) {
            zoo.size = Some(size);
        }
        if let Some(admission) = payload.admission {
            zoo.admission = Some(admission);
        }

        self.relationships
            .update_zoo(caller, zoo, payload.species_list.as_deref())
            .await
    }

    /// Deletes the zoo and checks its animals back in
    ///
    /// # Errors
    ///
    /// NotFound or Authorization from the guard, Conflict on a concurrent change.
    pub async fn delete(&self, caller: &UserId, id: ZooId) -> ApiResult<()> {
        let zoo = self.guard.zoo(caller, id).await?;
        self.relationships.delete_zoo(zoo).await
    }

    /// # Errors
    ///
    /// See [`RelationshipService::link`].
    pub async fn link(&self, caller: &UserId, zoo_id: ZooId, animal_id: AnimalId) -> ApiResult<Zoo> {
        self.relationships.link(caller, zoo_id, animal_id).await
    }

    /// # Errors
    ///
    /// See [`RelationshipService::unlink`].
    pub async fn unlink(&self, caller: &UserId, zoo_id: ZooId, animal_id: AnimalId) -> ApiResult<Zoo> {
        self.relationships.unlink(caller, zoo_id, animal_id).await
    }
}
