//! Wire types: request payloads and JSON representations

pub mod animal;
pub mod zoo;

pub use animal::{AnimalListParams, AnimalPayload, AnimalView};
pub use zoo::{LinkFailure, LinkFailureReason, ZooPayload, ZooView};
