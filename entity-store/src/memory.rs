use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use crate::batch::{Committed, EntityKey, WriteBatch, WriteOp};
use crate::error::{StoreError, StoreResult};
use crate::models::{Animal, AnimalId, Revision, Zoo, ZooId};
use crate::query::{AnimalQuery, ZooQuery};
use crate::repository::EntityStore;

#[derive(Debug, Default)]
struct Tables {
    animals: HashMap<AnimalId, Animal>,
    zoos: HashMap<ZooId, Zoo>,
    /// animal -> the zoo listing it
    holders: HashMap<AnimalId, ZooId>,
}

impl Tables {
    fn check_revision(key: EntityKey, stored: Option<Revision>, expected: Revision) -> StoreResult<()> {
        match stored {
            None => Err(StoreError::NotFound(key)),
            Some(found) if found != expected => Err(StoreError::Conflict { key, expected, found }),
            Some(_) => Ok(()),
        }
    }

    /// Check the whole batch against the current tables without touching them
    fn validate(&self, batch: &WriteBatch) -> StoreResult<()> {
        batch.check_keys()?;

        let mut inserted = HashSet::new();
        let mut deleted = HashSet::new();

        for op in batch.ops() {
            let key = op.key();
            match op {
                WriteOp::InsertAnimal(animal) => {
                    if let Some(existing) = self.animals.get(&animal.id) {
                        return Err(StoreError::Conflict { key, expected: 0, found: existing.revision });
                    }
                    inserted.insert(animal.id);
                }
                WriteOp::InsertZoo(zoo) => {
                    if let Some(existing) = self.zoos.get(&zoo.id) {
                        return Err(StoreError::Conflict { key, expected: 0, found: existing.revision });
                    }
                }
                WriteOp::PutAnimal(animal) => {
                    Self::check_revision(key, self.animals.get(&animal.id).map(|a| a.revision), animal.revision)?;
                }
                WriteOp::PutZoo(zoo) => {
                    Self::check_revision(key, self.zoos.get(&zoo.id).map(|z| z.revision), zoo.revision)?;
                }
                WriteOp::DeleteAnimal { id, revision } => {
                    Self::check_revision(key, self.animals.get(id).map(|a| a.revision), *revision)?;
                    deleted.insert(*id);
                }
                WriteOp::DeleteZoo { id, revision } => {
                    Self::check_revision(key, self.zoos.get(id).map(|z| z.revision), *revision)?;
                }
            }
        }

        // Holder index as it will look after the batch; None marks a release.
        let mut holders: HashMap<AnimalId, Option<ZooId>> = HashMap::new();

        for op in batch.ops() {
            let released = match op {
                WriteOp::PutZoo(zoo) => self.zoos.get(&zoo.id),
                WriteOp::DeleteZoo { id, .. } => self.zoos.get(id),
                _ => None,
            };
            for animal in released.into_iter().flat_map(|zoo| zoo.animals.iter()) {
                holders.insert(*animal, None);
            }
        }

        for op in batch.ops() {
            let zoo = match op {
                WriteOp::InsertZoo(zoo) | WriteOp::PutZoo(zoo) => zoo,
                _ => continue,
            };
            for animal in &zoo.animals {
                let exists = (self.animals.contains_key(animal) || inserted.contains(animal))
                    && !deleted.contains(animal);
                if !exists {
                    return Err(StoreError::Constraint(format!(
                        "zoo {} lists unknown animal {animal}",
                        zoo.id
                    )));
                }

                let holder = holders
                    .get(animal)
                    .copied()
                    .unwrap_or_else(|| self.holders.get(animal).copied());
                if let Some(other) = holder.filter(|other| *other != zoo.id) {
                    return Err(StoreError::Constraint(format!(
                        "animal {animal} is already listed by zoo {other}"
                    )));
                }
                holders.insert(*animal, Some(zoo.id));
            }
        }

        for animal in &deleted {
            let holder = holders
                .get(animal)
                .copied()
                .unwrap_or_else(|| self.holders.get(animal).copied());
            if let Some(zoo) = holder {
                return Err(StoreError::Constraint(format!(
                    "animal {animal} is still listed by zoo {zoo}"
                )));
            }
        }

        Ok(())
    }

    fn release(&mut self, zoo: &Zoo) {
        for animal in &zoo.animals {
            if self.holders.get(animal) == Some(&zoo.id) {
                self.holders.remove(animal);
            }
        }
    }

    fn store_zoo(&mut self, mut zoo: Zoo) -> Zoo {
        zoo.dedup_animals();
        if let Some(previous) = self.zoos.remove(&zoo.id) {
            self.release(&previous);
        }
        for animal in &zoo.animals {
            self.holders.insert(*animal, zoo.id);
        }
        self.zoos.insert(zoo.id, zoo.clone());
        zoo
    }

    fn apply(&mut self, batch: WriteBatch) -> Committed {
        let now = Utc::now();
        let mut committed = Committed::default();

        for op in batch.into_ops() {
            match op {
                WriteOp::InsertAnimal(mut animal) => {
                    animal.revision = 1;
                    self.animals.insert(animal.id, animal.clone());
                    committed.animals.push(animal);
                }
                WriteOp::PutAnimal(mut animal) => {
                    animal.revision = animal.revision.saturating_add(1);
                    animal.updated_at = now;
                    self.animals.insert(animal.id, animal.clone());
                    committed.animals.push(animal);
                }
                WriteOp::DeleteAnimal { id, .. } => {
                    self.animals.remove(&id);
                    self.holders.remove(&id);
                    committed.deleted.push(EntityKey::Animal(id));
                }
                WriteOp::InsertZoo(mut zoo) => {
                    zoo.revision = 1;
                    committed.zoos.push(self.store_zoo(zoo));
                }
                WriteOp::PutZoo(mut zoo) => {
                    zoo.revision = zoo.revision.saturating_add(1);
                    zoo.updated_at = now;
                    committed.zoos.push(self.store_zoo(zoo));
                }
                WriteOp::DeleteZoo { id, .. } => {
                    if let Some(zoo) = self.zoos.remove(&id) {
                        self.release(&zoo);
                    }
                    committed.deleted.push(EntityKey::Zoo(id));
                }
            }
        }

        committed
    }
}

/// Process-local store. All tables sit behind one lock, so a batch is
/// validated and applied without interleaving with other writers.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    tables: RwLock<Tables>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get_animal(&self, id: AnimalId) -> StoreResult<Option<Animal>> {
        Ok(self.tables.read().animals.get(&id).cloned())
    }

    async fn get_zoo(&self, id: ZooId) -> StoreResult<Option<Zoo>> {
        Ok(self.tables.read().zoos.get(&id).cloned())
    }

    async fn query_animals(&self, query: &AnimalQuery) -> StoreResult<Vec<Animal>> {
        let tables = self.tables.read();
        let mut animals: Vec<Animal> = tables
            .animals
            .values()
            .filter(|animal| query.matches(animal))
            .cloned()
            .collect();
        animals.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(animals)
    }

    async fn query_zoos(&self, query: &ZooQuery) -> StoreResult<Vec<Zoo>> {
        let tables = self.tables.read();

        // Served from the holder index rather than scanning species-lists
        if let Some(animal) = query.holding {
            let zoos = tables
                .holders
                .get(&animal)
                .and_then(|zoo| tables.zoos.get(zoo))
                .filter(|zoo| query.matches(zoo))
                .cloned()
                .into_iter()
                .collect();
            return Ok(zoos);
        }

        let mut zoos: Vec<Zoo> = tables
            .zoos
            .values()
            .filter(|zoo| query.matches(zoo))
            .cloned()
            .collect();
        zoos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(zoos)
    }

    async fn commit(&self, batch: WriteBatch) -> StoreResult<Committed> {
        let mut tables = self.tables.write();
        tables.validate(&batch)?;

        let operations = batch.len();
        let committed = tables.apply(batch);
        debug!(operations, "Committed write batch");
        Ok(committed)
    }

    async fn wipe(&self) -> StoreResult<()> {
        let mut tables = self.tables.write();
        tables.animals.clear();
        tables.zoos.clear();
        tables.holders.clear();
        Ok(())
    }
}
