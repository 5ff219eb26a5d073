use auth_identity::UserId;

use crate::models::{Animal, AnimalId, Zoo};

/// Filter for [`crate::EntityStore::query_animals`]; unset fields match everything
#[derive(Debug, Clone, Default)]
pub struct AnimalQuery {
    pub owner: Option<UserId>,
    pub species: Option<String>,
    pub checked_in: Option<bool>,
}

impl AnimalQuery {
    pub fn owned_by(owner: UserId) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }

    pub fn with_species(mut self, species: impl Into<String>) -> Self {
        self.species = Some(species.into());
        self
    }

    pub fn with_checked_in(mut self, checked_in: Option<bool>) -> Self {
        self.checked_in = checked_in;
        self
    }

    pub fn matches(&self, animal: &Animal) -> bool {
        self.owner.as_ref().map_or(true, |owner| &animal.owner == owner)
            && self.species.as_ref().map_or(true, |species| &animal.species == species)
            && self.checked_in.map_or(true, |flag| animal.checked_in == flag)
    }
}

/// Filter for [`crate::EntityStore::query_zoos`]; unset fields match everything
#[derive(Debug, Clone, Default)]
pub struct ZooQuery {
    pub owner: Option<UserId>,
    /// Only the zoo whose species-list contains this animal
    pub holding: Option<AnimalId>,
}

impl ZooQuery {
    pub fn owned_by(owner: UserId) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }

    pub fn holding(animal: AnimalId) -> Self {
        Self {
            holding: Some(animal),
            ..Self::default()
        }
    }

    pub fn matches(&self, zoo: &Zoo) -> bool {
        self.owner.as_ref().map_or(true, |owner| &zoo.owner == owner)
            && self.holding.map_or(true, |animal| zoo.lists(animal))
    }
}
