//! Entity storage for Menagerie
//!
//! Animals and zoos reference each other: a zoo lists the animals checked out
//! to it, and each animal records whether it is checked in. Every change that
//! touches both sides is expressed as one [`WriteBatch`] and committed
//! atomically, with per-record revisions guarding against lost updates.
//!
//! Two backends implement [`EntityStore`]:
//!
//! - [`InMemoryEntityStore`]: tables behind a single lock, used by default
//!   and in tests
//! - `PgEntityStore` (feature `postgres`): sqlx/Postgres with an explicit
//!   `zoo_animals` join table
//!
//! # Example
//!
//! ```rust
//! use entity_store::{Animal, EntityStore, InMemoryEntityStore, WriteBatch, Zoo};
//! use auth_identity::UserId;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), entity_store::StoreError> {
//! let store = InMemoryEntityStore::new();
//! let keeper = UserId::new("keeper");
//!
//! let mut lion = Animal::new(keeper.clone(), "Lion");
//! let mut zoo = Zoo::new(keeper, "City Zoo");
//! lion.checked_in = false;
//! zoo.add_animal(lion.id);
//! let zoo_id = zoo.id;
//!
//! let mut batch = WriteBatch::new();
//! batch.insert_animal(lion).insert_zoo(zoo);
//! let mut committed = store.commit(batch).await?;
//! assert_eq!(committed.take_zoo(zoo_id).map(|z| z.revision), Some(1));
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod error;
pub mod memory;
pub mod models;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod query;
pub mod repository;

pub use batch::{Committed, EntityKey, WriteBatch, WriteOp};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryEntityStore;
pub use models::{Animal, AnimalId, Owned, Revision, Zoo, ZooId};
#[cfg(feature = "postgres")]
pub use postgres::PgEntityStore;
pub use query::{AnimalQuery, ZooQuery};
pub use repository::EntityStore;
