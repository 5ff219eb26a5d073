use crate::error::{ApiError, ApiResult};
use crate::validation::RequestValidation;
use crate::{validate_field, validate_required};
use chrono::{DateTime, Utc};
use entity_store::Animal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Animal request body for POST, PUT and PATCH
///
/// Unknown fields are ignored. `null` and absent are equivalent.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AnimalPayload {
    #[schema(example = "Lion")]
    pub species: Option<String>,
    #[schema(example = 4)]
    pub population: Option<i64>,
    #[schema(example = "Carnivore")]
    pub consumption_class: Option<String>,
    /// Derived from zoo membership; may only restate the current value
    pub checked_in: Option<bool>,
}

impl RequestValidation for AnimalPayload {
    fn validate(&self) -> Result<(), ApiError> {
        let species = self.species.as_deref().unwrap_or_default();
        validate_required!(species, "species is required");
        self.validate_partial()
    }

    fn validate_partial(&self) -> Result<(), ApiError> {
        if let Some(species) = self.species.as_deref() {
            validate_required!(species, "species cannot be blank");
        }
        if let Some(population) = self.population {
            validate_field!(population, population >= 0, "population cannot be negative");
        }
        Ok(())
    }
}

/// Query string of `GET /animals`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnimalListParams {
    /// `true` or `false`
    #[serde(rename = "checkedIn")]
    pub checked_in: Option<String>,
}

impl AnimalListParams {
    /// Parsed `checkedIn` filter
    ///
    /// # Errors
    ///
    /// Any value other than `true` or `false` is a validation error.
    pub fn checked_in_filter(&self) -> ApiResult<Option<bool>> {
        match self.checked_in.as_deref() {
            None => Ok(None),
            Some("true") => Ok(Some(true)),
            Some("false") => Ok(Some(false)),
            Some(other) => Err(ApiError::validation(format!(
                "checkedIn must be true or false, got '{other}'"
            ))),
        }
    }
}

/// JSON representation of an animal
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnimalView {
    pub id: Uuid,
    #[serde(rename = "self")]
    #[schema(example = "/animals/5b1c3f0e-2f4e-4d7b-9a53-0d7f3c1f8a11")]
    pub self_link: String,
    pub user_id: String,
    pub species: String,
    pub population: Option<i64>,
    pub consumption_class: Option<String>,
    pub checked_in: bool,
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Animal> for AnimalView {
    fn from(animal: Animal) -> Self {
        Self {
            id: animal.id.as_uuid(),
            self_link: animal.id.self_link(),
            user_id: animal.owner.to_string(),
            species: animal.species,
            population: animal.population,
            consumption_class: animal.consumption_class,
            checked_in: animal.checked_in,
            revision: animal.revision,
            created_at: animal.created_at,
            updated_at: animal.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth_identity::UserId;

    #[test]
    fn create_requires_species() {
        assert!(AnimalPayload::default().validate().is_err());

        let payload = AnimalPayload {
            species: Some("Lion".to_string()),
            ..Default::default()
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn patch_accepts_missing_species_but_not_blank() {
        assert!(AnimalPayload::default().validate_partial().is_ok());

        let blank = AnimalPayload {
            species: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(blank.validate_partial().is_err());
    }

    #[test]
    fn checked_in_filter_parses_booleans_only() {
        let params = |value: &str| AnimalListParams {
            checked_in: Some(value.to_string()),
        };
        assert_eq!(params("true").checked_in_filter().unwrap(), Some(true));
        assert_eq!(params("false").checked_in_filter().unwrap(), Some(false));
        assert!(params("yes").checked_in_filter().is_err());
        assert_eq!(AnimalListParams::default().checked_in_filter().unwrap(), None);
    }

    #[test]
    fn view_carries_self_link_and_owner() {
        let animal = Animal::new(UserId::new("keeper"), "Lion");
        let id = animal.id;
        let value = serde_json::to_value(AnimalView::from(animal)).unwrap();
        assert_eq!(value["self"], format!("/animals/{id}"));
        assert_eq!(value["user_id"], "keeper");
        assert_eq!(value["checked_in"], true);
        assert!(value["population"].is_null());
    }
}
