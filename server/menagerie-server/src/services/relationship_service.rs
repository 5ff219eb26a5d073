//! Keeps both sides of the zoo/animal relationship in step
//!
//! A zoo's species-list and each animal's `checked_in` flag are written
//! together in one [`WriteBatch`]. The store rejects the whole batch when any
//! record changed since it was read, so concurrent edits end in a conflict
//! instead of a half-applied link.

use crate::error::{ApiError, ApiResult};
use crate::services::AccessGuard;
use crate::types::{LinkFailure, LinkFailureReason};
use auth_identity::UserId;
use entity_store::{
    Animal, AnimalId, AnimalQuery, EntityStore, WriteBatch, Zoo, ZooId, ZooQuery,
};
use std::sync::Arc;
use tracing::{info, warn};

/// A written zoo plus the species-list items that could not be linked
#[derive(Debug, Clone)]
pub struct ZooOutcome {
    pub zoo: Zoo,
    pub link_errors: Vec<LinkFailure>,
}

enum Resolved {
    Animal(Animal),
    Failed(LinkFailureReason),
}

/// Animals a species-list resolves to, in request order
#[derive(Default)]
struct Resolution {
    animals: Vec<Animal>,
    failures: Vec<LinkFailure>,
}

#[derive(Clone)]
pub struct RelationshipService {
    store: Arc<dyn EntityStore>,
    guard: AccessGuard,
}

impl RelationshipService {
    pub fn new(store: Arc<dyn EntityStore>, guard: AccessGuard) -> Self {
        Self { store, guard }
    }

    /// Checks an animal out to a zoo. Linking an already listed animal is a
    /// no-op that returns the zoo unchanged.
    ///
    /// # Errors
    ///
    /// Conflict when another zoo holds the animal.
    pub async fn link(&self, caller: &UserId, zoo_id: ZooId, animal_id: AnimalId) -> ApiResult<Zoo> {
        let mut zoo = self.guard.zoo(caller, zoo_id).await?;
        let mut animal = self.guard.animal(caller, animal_id).await?;
        if zoo.lists(animal.id) {
            return Ok(zoo);
        }

        let holders = self.store.query_zoos(&ZooQuery::holding(animal.id)).await?;
        if let Some(holder) = holders.first() {
            return Err(ApiError::conflict(format!(
                "animal {} is already checked out to zoo {}",
                animal.id, holder.id
            )));
        }

        zoo.add_animal(animal.id);
        animal.checked_in = false;
        let mut batch = WriteBatch::new();
        batch.put_animal(animal).put_zoo(zoo);
        let mut committed = self.store.commit(batch).await?;

        info!(zoo = %zoo_id, animal = %animal_id, "Animal checked out to zoo");
        committed
            .take_zoo(zoo_id)
            .ok_or_else(|| ApiError::internal("committed batch is missing the zoo"))
    }

    /// Checks an animal back in from a zoo
    ///
    /// # Errors
    ///
    /// NotFound when the zoo does not list the animal.
    pub async fn unlink(&self, caller: &UserId, zoo_id: ZooId, animal_id: AnimalId) -> ApiResult<Zoo> {
        let mut zoo = self.guard.zoo(caller, zoo_id).await?;
        let mut animal = self.guard.animal(caller, animal_id).await?;
        if !zoo.remove_animal(animal.id) {
            return Err(ApiError::not_found(
                "animal",
                format!("{animal_id} in zoo {zoo_id}"),
            ));
        }

        animal.checked_in = true;
        let mut batch = WriteBatch::new();
        batch.put_animal(animal).put_zoo(zoo);
        let mut committed = self.store.commit(batch).await?;

        info!(zoo = %zoo_id, animal = %animal_id, "Animal checked in from zoo");
        committed
            .take_zoo(zoo_id)
            .ok_or_else(|| ApiError::internal("committed batch is missing the zoo"))
    }

    /// Inserts a new zoo with its species-list resolved from `items`
    ///
    /// # Errors
    ///
    /// Store failures; unresolvable items are reported in the outcome instead.
    pub async fn create_zoo(&self, caller: &UserId, mut zoo: Zoo, items: &[String]) -> ApiResult<ZooOutcome> {
        let resolution = self.resolve_items(caller, &zoo, items).await?;
        let mut batch = WriteBatch::new();
        self.stage_species_list(&mut zoo, resolution.animals, &mut batch)
            .await?;

        let zoo_id = zoo.id;
        let listed = zoo.animals.len();
        batch.insert_zoo(zoo);
        let mut committed = self.store.commit(batch).await?;

        info!(
            zoo = %zoo_id,
            listed,
            link_errors = resolution.failures.len(),
            "Zoo created"
        );
        Ok(ZooOutcome {
            zoo: committed
                .take_zoo(zoo_id)
                .ok_or_else(|| ApiError::internal("committed batch is missing the zoo"))?,
            link_errors: resolution.failures,
        })
    }

    /// Writes an edited zoo. With `items` the species-list is replaced by
    /// their resolution; without it the current list is kept.
    ///
    /// # Errors
    ///
    /// Store failures, including a revision conflict.
    pub async fn update_zoo(
        &self,
        caller: &UserId,
        mut zoo: Zoo,
        items: Option<&[String]>,
    ) -> ApiResult<ZooOutcome> {
        let mut batch = WriteBatch::new();
        let mut link_errors = Vec::new();
        if let Some(items) = items {
            let resolution = self.resolve_items(caller, &zoo, items).await?;
            self.stage_species_list(&mut zoo, resolution.animals, &mut batch)
                .await?;
            link_errors = resolution.failures;
        }

        let zoo_id = zoo.id;
        batch.put_zoo(zoo);
        let mut committed = self.store.commit(batch).await?;

        info!(zoo = %zoo_id, link_errors = link_errors.len(), "Zoo updated");
        Ok(ZooOutcome {
            zoo: committed
                .take_zoo(zoo_id)
                .ok_or_else(|| ApiError::internal("committed batch is missing the zoo"))?,
            link_errors,
        })
    }

    /// Deletes an animal and drops it from the zoo holding it
    ///
    /// # Errors
    ///
    /// Store failures, including a revision conflict.
    pub async fn delete_animal(&self, animal: Animal) -> ApiResult<()> {
        let holders = self.store.query_zoos(&ZooQuery::holding(animal.id)).await?;
        let released_from = holders.len();

        let mut batch = WriteBatch::new();
        for mut zoo in holders {
            zoo.remove_animal(animal.id);
            batch.put_zoo(zoo);
        }
        batch.delete_animal(&animal);
        self.store.commit(batch).await?;

        info!(animal = %animal.id, released_from, "Animal deleted");
        Ok(())
    }

    /// Deletes a zoo and checks every listed animal back in
    ///
    /// # Errors
    ///
    /// Store failures, including a revision conflict.
    pub async fn delete_zoo(&self, zoo: Zoo) -> ApiResult<()> {
        let mut batch = WriteBatch::new();
        let mut released = 0usize;
        for id in &zoo.animals {
            match self.store.get_animal(*id).await? {
                Some(mut animal) => {
                    animal.checked_in = true;
                    batch.put_animal(animal);
                    released = released.saturating_add(1);
                }
                None => warn!(zoo = %zoo.id, animal = %id, "Skipping dangling species-list entry"),
            }
        }
        batch.delete_zoo(&zoo);
        self.store.commit(batch).await?;

        info!(zoo = %zoo.id, released, "Zoo deleted");
        Ok(())
    }

    async fn resolve_items(&self, caller: &UserId, zoo: &Zoo, items: &[String]) -> ApiResult<Resolution> {
        let mut resolution = Resolution::default();
        for raw in items {
            let item = raw.trim();
            if item.is_empty() {
                continue;
            }

            let resolved = if item.starts_with("/animals/") {
                self.resolve_reference(caller, zoo, item).await?
            } else {
                self.resolve_species(caller, zoo, item, &resolution.animals)
                    .await?
            };

            match resolved {
                Resolved::Animal(animal) => {
                    // repeated references collapse to one entry
                    if !resolution.animals.iter().any(|chosen| chosen.id == animal.id) {
                        resolution.animals.push(animal);
                    }
                }
                Resolved::Failed(reason) => {
                    resolution.failures.push(LinkFailure::new(item, reason));
                }
            }
        }
        Ok(resolution)
    }

    async fn resolve_reference(&self, caller: &UserId, zoo: &Zoo, item: &str) -> ApiResult<Resolved> {
        let Some(id) = AnimalId::from_self_link(item) else {
            return Ok(Resolved::Failed(LinkFailureReason::NotFound));
        };
        let Some(animal) = self.store.get_animal(id).await? else {
            return Ok(Resolved::Failed(LinkFailureReason::NotFound));
        };
        if &animal.owner != caller {
            return Ok(Resolved::Failed(LinkFailureReason::NotAuthorized));
        }
        if !animal.checked_in && !zoo.lists(animal.id) {
            return Ok(Resolved::Failed(LinkFailureReason::Unavailable));
        }
        Ok(Resolved::Animal(animal))
    }

    async fn resolve_species(
        &self,
        caller: &UserId,
        zoo: &Zoo,
        species: &str,
        chosen: &[Animal],
    ) -> ApiResult<Resolved> {
        let matching = self
            .store
            .query_animals(&AnimalQuery::default().with_species(species))
            .await?;
        let (owned, foreign): (Vec<Animal>, Vec<Animal>) =
            matching.into_iter().partition(|animal| &animal.owner == caller);

        let mut candidates = owned.iter().filter(|animal| {
            (animal.checked_in || zoo.lists(animal.id))
                && !chosen.iter().any(|picked| picked.id == animal.id)
        });

        let resolved = match (candidates.next(), candidates.next()) {
            (Some(animal), None) => Resolved::Animal(animal.clone()),
            (Some(_), Some(_)) => Resolved::Failed(LinkFailureReason::Ambiguous),
            (None, _) if !owned.is_empty() => Resolved::Failed(LinkFailureReason::Unavailable),
            (None, _) if !foreign.is_empty() => Resolved::Failed(LinkFailureReason::NotAuthorized),
            (None, _) => Resolved::Failed(LinkFailureReason::NotFound),
        };
        Ok(resolved)
    }

    /// Adds animal writes for moving `zoo` to the `desired` species-list
    async fn stage_species_list(
        &self,
        zoo: &mut Zoo,
        desired: Vec<Animal>,
        batch: &mut WriteBatch,
    ) -> ApiResult<()> {
        let removed: Vec<AnimalId> = zoo
            .animals
            .iter()
            .copied()
            .filter(|id| !desired.iter().any(|animal| animal.id == *id))
            .collect();

        for id in removed {
            match self.store.get_animal(id).await? {
                Some(mut animal) => {
                    animal.checked_in = true;
                    batch.put_animal(animal);
                    info!(zoo = %zoo.id, animal = %id, "Animal checked in from zoo");
                }
                None => warn!(zoo = %zoo.id, animal = %id, "Skipping dangling species-list entry"),
            }
        }

        let mut listing = Vec::with_capacity(desired.len());
        for mut animal in desired {
            listing.push(animal.id);
            if animal.checked_in {
                info!(zoo = %zoo.id, animal = %animal.id, "Animal checked out to zoo");
                animal.checked_in = false;
                batch.put_animal(animal);
            }
        }
        zoo.animals = listing;
        Ok(())
    }
}
