//! Domain services behind the resource handlers
//!
//! - [`AccessGuard`]: fetch-then-authorize for single entities
//! - [`RelationshipService`]: keeps zoo species-lists and animal `checked_in`
//!   flags consistent, one atomic batch per change
//! - [`AnimalService`], [`ZooService`]: the resource operations

pub mod access_guard;
pub mod animal_service;
pub mod relationship_service;
pub mod zoo_service;

pub use access_guard::{authorize, parse_id, AccessGuard};
pub use animal_service::AnimalService;
pub use relationship_service::{RelationshipService, ZooOutcome};
pub use zoo_service::ZooService;
