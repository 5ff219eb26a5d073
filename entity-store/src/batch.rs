use std::collections::HashSet;
use std::fmt;

use crate::error::{StoreError, StoreResult};
use crate::models::{Animal, AnimalId, Revision, Zoo, ZooId};

/// Identifies one record in either table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Animal(AnimalId),
    Zoo(ZooId),
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Animal(id) => write!(f, "animal {id}"),
            Self::Zoo(id) => write!(f, "zoo {id}"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Create a record; fails if the id is taken
    InsertAnimal(Animal),
    InsertZoo(Zoo),
    /// Overwrite a record; its `revision` must equal the stored one
    PutAnimal(Animal),
    PutZoo(Zoo),
    DeleteAnimal { id: AnimalId, revision: Revision },
    DeleteZoo { id: ZooId, revision: Revision },
}

impl WriteOp {
    pub fn key(&self) -> EntityKey {
        match self {
            Self::InsertAnimal(animal) | Self::PutAnimal(animal) => EntityKey::Animal(animal.id),
            Self::InsertZoo(zoo) | Self::PutZoo(zoo) => EntityKey::Zoo(zoo.id),
            Self::DeleteAnimal { id, .. } => EntityKey::Animal(*id),
            Self::DeleteZoo { id, .. } => EntityKey::Zoo(*id),
        }
    }
}

/// Set of writes committed together by [`crate::EntityStore::commit`].
///
/// Backends may apply operations in order, so callers put zoo updates that
/// release an animal before the deletion of that animal.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_animal(&mut self, animal: Animal) -> &mut Self {
        self.ops.push(WriteOp::InsertAnimal(animal));
        self
    }

    pub fn insert_zoo(&mut self, zoo: Zoo) -> &mut Self {
        self.ops.push(WriteOp::InsertZoo(zoo));
        self
    }

    pub fn put_animal(&mut self, animal: Animal) -> &mut Self {
        self.ops.push(WriteOp::PutAnimal(animal));
        self
    }

    pub fn put_zoo(&mut self, zoo: Zoo) -> &mut Self {
        self.ops.push(WriteOp::PutZoo(zoo));
        self
    }

    pub fn delete_animal(&mut self, animal: &Animal) -> &mut Self {
        self.ops.push(WriteOp::DeleteAnimal {
            id: animal.id,
            revision: animal.revision,
        });
        self
    }

    pub fn delete_zoo(&mut self, zoo: &Zoo) -> &mut Self {
        self.ops.push(WriteOp::DeleteZoo {
            id: zoo.id,
            revision: zoo.revision,
        });
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Reject batches touching the same record twice
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidBatch`] naming the repeated record.
    pub fn check_keys(&self) -> StoreResult<()> {
        let mut seen = HashSet::with_capacity(self.ops.len());
        for op in &self.ops {
            let key = op.key();
            if !seen.insert(key) {
                return Err(StoreError::InvalidBatch(format!(
                    "{key} appears more than once"
                )));
            }
        }
        Ok(())
    }
}

/// Records written by a batch, at their new revisions
#[derive(Debug, Clone, Default)]
pub struct Committed {
    pub animals: Vec<Animal>,
    pub zoos: Vec<Zoo>,
    pub deleted: Vec<EntityKey>,
}

impl Committed {
    pub fn take_animal(&mut self, id: AnimalId) -> Option<Animal> {
        let index = self.animals.iter().position(|animal| animal.id == id)?;
        Some(self.animals.swap_remove(index))
    }

    pub fn take_zoo(&mut self, id: ZooId) -> Option<Zoo> {
        let index = self.zoos.iter().position(|zoo| zoo.id == id)?;
        Some(self.zoos.swap_remove(index))
    }
}
