use crate::error::ApiError;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_required};
use chrono::{DateTime, Utc};
use entity_store::Zoo;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Zoo request body for POST, PUT and PATCH
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ZooPayload {
    #[schema(example = "City Zoo")]
    pub name: Option<String>,
    #[schema(example = "Corvallis")]
    pub city: Option<String>,
    #[schema(example = "OR")]
    pub state: Option<String>,
    #[schema(example = "Large")]
    pub size: Option<String>,
    #[schema(example = 12.5)]
    pub admission: Option<f64>,
    /// Animal references (`/animals/<id>`) or species names
    #[schema(example = json!(["Lion", "/animals/5b1c3f0e-2f4e-4d7b-9a53-0d7f3c1f8a11"]))]
    pub species_list: Option<Vec<String>>,
}

impl RequestValidation for ZooPayload {
    fn validate(&self) -> Result<(), ApiError> {
        let name = self.name.as_deref().unwrap_or_default();
        validate_required!(name, "name is required");
        self.validate_partial()
    }

    fn validate_partial(&self) -> Result<(), ApiError> {
        if let Some(name) = self.name.as_deref() {
            validate_required!(name, "name cannot be blank");
        }
        if let Some(admission) = self.admission {
            validate_field!(
                admission,
                admission.is_finite() && admission >= 0.0,
                "admission must be a non-negative number"
            );
        }
        Ok(())
    }
}

/// Why one species-list item could not be linked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LinkFailureReason {
    /// No animal matches the reference or species name
    NotFound,
    /// The matching animal belongs to another user
    NotAuthorized,
    /// Several of the caller's animals match the species name
    Ambiguous,
    /// The caller's matching animals are all checked out to other zoos
    Unavailable,
}

/// Per-item failure while resolving a zoo's species-list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LinkFailure {
    #[schema(example = "Lion")]
    pub item: String,
    pub reason: LinkFailureReason,
}

impl LinkFailure {
    pub fn new(item: impl Into<String>, reason: LinkFailureReason) -> Self {
        Self {
            item: item.into(),
            reason,
        }
    }
}

/// JSON representation of a zoo
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ZooView {
    pub id: Uuid,
    #[serde(rename = "self")]
    #[schema(example = "/zoos/0a4f8c6e-7e0b-4c55-8d0e-3e0f9a1b2c3d")]
    pub self_link: String,
    pub user_id: String,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub size: Option<String>,
    pub admission: Option<f64>,
    /// Links of the animals checked out to this zoo
    pub species_list: Vec<String>,
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Species-list items that could not be linked by this request
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link_errors: Vec<LinkFailure>,
}

impl ZooView {
    pub fn with_link_errors(mut self, link_errors: Vec<LinkFailure>) -> Self {
        self.link_errors = link_errors;
        self
    }
}

impl From<Zoo> for ZooView {
    fn from(zoo: Zoo) -> Self {
        Self {
            id: zoo.id.as_uuid(),
            self_link: zoo.id.self_link(),
            user_id: zoo.owner.to_string(),
            species_list: zoo.animals.iter().map(|id| id.self_link()).collect(),
            name: zoo.name,
            city: zoo.city,
            state: zoo.state,
            size: zoo.size,
            admission: zoo.admission,
            revision: zoo.revision,
            created_at: zoo.created_at,
            updated_at: zoo.updated_at,
            link_errors: Vec::new(),
        }
    }
}
