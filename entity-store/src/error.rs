use thiserror::Error;

use crate::batch::EntityKey;
use crate::models::Revision;

#[derive(Error, Debug)]
pub enum StoreError {
    /// A put or delete named a record that no longer exists
    #[error("{0} not found")]
    NotFound(EntityKey),

    /// The record changed since it was read, or an insert collided with an existing id
    #[error("write conflict on {key}: expected revision {expected}, found {found}")]
    Conflict {
        key: EntityKey,
        expected: Revision,
        found: Revision,
    },

    /// The batch would break the zoo/animal relationship rules
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The batch itself is malformed
    #[error("invalid batch: {0}")]
    InvalidBatch(String),

    /// The storage backend failed
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &error {
            // unique_violation / foreign_key_violation
            if matches!(db.code().as_deref(), Some("23505" | "23503")) {
                return Self::Constraint(db.message().to_string());
            }
        }
        Self::Backend(error.to_string())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
