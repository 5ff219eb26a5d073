use crate::error::{ApiError, ApiResult};
use crate::services::{AccessGuard, RelationshipService};
use crate::types::AnimalPayload;
use crate::validation::{non_blank, RequestValidation};
use auth_identity::UserId;
use entity_store::{Animal, AnimalId, AnimalQuery, EntityStore, WriteBatch};
use std::sync::Arc;
use tracing::info;

/// Animal create, read, update and delete for the calling user
#[derive(Clone)]
pub struct AnimalService {
    store: Arc<dyn EntityStore>,
    guard: AccessGuard,
    relationships: RelationshipService,
}

impl AnimalService {
    pub fn new(store: Arc<dyn EntityStore>, guard: AccessGuard, relationships: RelationshipService) -> Self {
        Self {
            store,
            guard,
            relationships,
        }
    }

    /// Creates a checked-in animal owned by `caller`
    ///
    /// # Errors
    ///
    /// Validation when `species` is missing or the body asks for a
    /// checked-out animal.
    pub async fn create(&self, caller: &UserId, payload: AnimalPayload) -> ApiResult<Animal> {
        payload.validate()?;
        if payload.checked_in == Some(false) {
            return Err(ApiError::validation(
                "animals are created checked in; check one out with PUT /zoos/{zoo_id}/animals/{animal_id}",
            ));
        }

        let species = non_blank(payload.species.as_deref()).unwrap_or_default();
        let mut animal = Animal::new(caller.clone(), species);
        animal.population = payload.population;
        animal.consumption_class = non_blank(payload.consumption_class.as_deref());

        let id = animal.id;
        let mut batch = WriteBatch::new();
        batch.insert_animal(animal);
        let mut committed = self.store.commit(batch).await?;

        info!(animal = %id, owner = %caller, "Animal created");
        committed
            .take_animal(id)
            .ok_or_else(|| ApiError::internal("committed batch is missing the animal"))
    }

    /// # Errors
    ///
    /// NotFound or Authorization from the guard.
    pub async fn get(&self, caller: &UserId, id: AnimalId) -> ApiResult<Animal> {
        self.guard.animal(caller, id).await
    }

    /// The caller's animals, optionally filtered by `checked_in`
    ///
    /// # Errors
    ///
    /// Store failures.
    pub async fn list(&self, caller: &UserId, checked_in: Option<bool>) -> ApiResult<Vec<Animal>> {
        let query = AnimalQuery::owned_by(caller.clone()).with_checked_in(checked_in);
        Ok(self.store.query_animals(&query).await?)
    }

    /// Full replace: absent optional fields are cleared
    ///
    /// # Errors
    ///
    /// Validation for a missing species or a contradicting `checked_in`.
    pub async fn replace(&self, caller: &UserId, id: AnimalId, payload: AnimalPayload) -> ApiResult<Animal> {
        payload.validate()?;
        let mut animal = self.guard.animal(caller, id).await?;
        ensure_linkage_unchanged(&animal, payload.checked_in)?;

        if let Some(species) = non_blank(payload.species.as_deref()) {
            animal.species = species;
        }
        animal.population = payload.population;
        animal.consumption_class = non_blank(payload.consumption_class.as_deref());
        self.save(animal).await
    }

    /// Partial update: only present fields change
    ///
    /// # Errors
    ///
    /// Validation for a blank species or a contradicting `checked_in`.
    pub async fn patch(&self, caller: &UserId, id: AnimalId, payload: AnimalPayload) -> ApiResult<Animal> {
        payload.validate_partial()?;
        let mut animal = self.guard.animal(caller, id).await?;
        ensure_linkage_unchanged(&animal, payload.checked_in)?;

        if let Some(species) = non_blank(payload.species.as_deref()) {
            animal.species = species;
        }
        if let Some(population) = payload.population {
            animal.population = Some(population);
        }
        if let Some(consumption_class) = non_blank(payload.consumption_class.as_deref()) {
            animal.consumption_class = Some(consumption_class);
        }
        self.save(animal).await
    }

    /// Deletes the animal and removes it from the zoo holding it
    ///
    /// # Errors
    ///
    /// NotFound or Authorization from the guard, Conflict on a concurrent change.
    pub async fn delete(&self, caller: &UserId, id: AnimalId) -> ApiResult<()> {
        let animal = self.guard.animal(caller, id).await?;
        self.relationships.delete_animal(animal).await
    }

    async fn save(&self, animal: Animal) -> ApiResult<Animal> {
        let id = animal.id;
        let mut batch = WriteBatch::new();
        batch.put_animal(animal);
        let mut committed = self.store.commit(batch).await?;

        info!(animal = %id, "Animal updated");
        committed
            .take_animal(id)
            .ok_or_else(|| ApiError::internal("committed batch is missing the animal"))
    }
}

/// `checked_in` follows zoo membership and can only be restated in a body
fn ensure_linkage_unchanged(animal: &Animal, requested: Option<bool>) -> ApiResult<()> {
    match requested {
        Some(checked_in) if checked_in != animal.checked_in => Err(ApiError::validation(
            "checked_in follows zoo membership; use PUT or DELETE /zoos/{zoo_id}/animals/{animal_id}",
        )),
        _ => Ok(()),
    }
}
