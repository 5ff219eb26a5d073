use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use auth_identity::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-managed record version. Zero means "never stored".
pub type Revision = u64;

macro_rules! entity_id {
    ($name:ident, $collection:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }

            /// Resource path, e.g. `/animals/<uuid>`
            pub fn self_link(&self) -> String {
                format!(concat!("/", $collection, "/{}"), self.0)
            }

            /// Parse a resource path produced by [`Self::self_link`]
            pub fn from_self_link(link: &str) -> Option<Self> {
                link.trim()
                    .strip_prefix(concat!("/", $collection, "/"))
                    .and_then(|id| id.trim_end_matches('/').parse().ok())
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(AnimalId, "animals");
entity_id!(ZooId, "zoos");

/// Anything carrying the id of the user who created it
pub trait Owned {
    /// Human readable entity kind used in messages
    const KIND: &'static str;

    fn owner(&self) -> &UserId;

    fn self_link(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: AnimalId,
    pub owner: UserId,
    pub species: String,
    pub population: Option<i64>,
    pub consumption_class: Option<String>,
    /// False exactly while some zoo lists this animal
    pub checked_in: bool,
    pub revision: Revision,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Animal {
    /// New, unsaved, checked-in animal with a fresh id
    pub fn new(owner: UserId, species: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: AnimalId::generate(),
            owner,
            species: species.into(),
            population: None,
            consumption_class: None,
            checked_in: true,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Owned for Animal {
    const KIND: &'static str = "animal";

    fn owner(&self) -> &UserId {
        &self.owner
    }

    fn self_link(&self) -> String {
        self.id.self_link()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zoo {
    pub id: ZooId,
    pub owner: UserId,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub size: Option<String>,
    pub admission: Option<f64>,
    /// The species-list: animals checked out to this zoo, in insertion order
    pub animals: Vec<AnimalId>,
    pub revision: Revision,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Zoo {
    /// New, unsaved zoo with an empty species-list
    pub fn new(owner: UserId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ZooId::generate(),
            owner,
            name: name.into(),
            city: None,
            state: None,
            size: None,
            admission: None,
            animals: Vec::new(),
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn lists(&self, animal: AnimalId) -> bool {
        self.animals.contains(&animal)
    }

    /// Appends the animal unless already listed. Returns whether it was added.
    pub fn add_animal(&mut self, animal: AnimalId) -> bool {
        if self.lists(animal) {
            return false;
        }
        self.animals.push(animal);
        true
    }

    /// Removes every occurrence. Returns whether anything was removed.
    pub fn remove_animal(&mut self, animal: AnimalId) -> bool {
        let before = self.animals.len();
        self.animals.retain(|listed| *listed != animal);
        self.animals.len() != before
    }

    /// Collapse duplicate ids, keeping first occurrences
    pub fn dedup_animals(&mut self) {
        let mut seen = HashSet::with_capacity(self.animals.len());
        self.animals.retain(|id| seen.insert(*id));
    }
}

impl Owned for Zoo {
    const KIND: &'static str = "zoo";

    fn owner(&self) -> &UserId {
        &self.owner
    }

    fn self_link(&self) -> String {
        self.id.self_link()
    }
}
