use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use auth_identity::UserId;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::batch::{Committed, EntityKey, WriteBatch, WriteOp};
use crate::error::{StoreError, StoreResult};
use crate::models::{Animal, AnimalId, Revision, Zoo, ZooId};
use crate::query::{AnimalQuery, ZooQuery};
use crate::repository::EntityStore;

const SCHEMA: &[&str] = &[
    r"CREATE TABLE IF NOT EXISTS animals (
        id UUID PRIMARY KEY,
        owner_id TEXT NOT NULL,
        species TEXT NOT NULL,
        population BIGINT,
        consumption_class TEXT,
        checked_in BOOLEAN NOT NULL DEFAULT TRUE,
        revision BIGINT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )",
    r"CREATE INDEX IF NOT EXISTS animals_owner_species_idx ON animals (owner_id, species)",
    r"CREATE TABLE IF NOT EXISTS zoos (
        id UUID PRIMARY KEY,
        owner_id TEXT NOT NULL,
        name TEXT NOT NULL,
        city TEXT,
        state TEXT,
        size TEXT,
        admission DOUBLE PRECISION,
        revision BIGINT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )",
    r"CREATE INDEX IF NOT EXISTS zoos_owner_idx ON zoos (owner_id)",
    r"CREATE TABLE IF NOT EXISTS zoo_animals (
        zoo_id UUID NOT NULL REFERENCES zoos (id) ON DELETE CASCADE,
        animal_id UUID NOT NULL REFERENCES animals (id) DEFERRABLE INITIALLY DEFERRED,
        position INTEGER NOT NULL,
        PRIMARY KEY (zoo_id, animal_id),
        CONSTRAINT zoo_animals_animal_once UNIQUE (animal_id) DEFERRABLE INITIALLY DEFERRED
    )",
];

#[derive(Debug, FromRow)]
struct AnimalRow {
    id: Uuid,
    owner_id: String,
    species: String,
    population: Option<i64>,
    consumption_class: Option<String>,
    checked_in: bool,
    revision: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AnimalRow> for Animal {
    type Error = StoreError;

    fn try_from(row: AnimalRow) -> StoreResult<Self> {
        Ok(Self {
            id: AnimalId::from(row.id),
            owner: UserId::new(row.owner_id),
            species: row.species,
            population: row.population,
            consumption_class: row.consumption_class,
            checked_in: row.checked_in,
            revision: from_db_revision(row.revision)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ZooRow {
    id: Uuid,
    owner_id: String,
    name: String,
    city: Option<String>,
    state: Option<String>,
    size: Option<String>,
    admission: Option<f64>,
    revision: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ZooRow {
    fn into_zoo(self, animals: Vec<AnimalId>) -> StoreResult<Zoo> {
        Ok(Zoo {
            id: ZooId::from(self.id),
            owner: UserId::new(self.owner_id),
            name: self.name,
            city: self.city,
            state: self.state,
            size: self.size,
            admission: self.admission,
            animals,
            revision: from_db_revision(self.revision)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn from_db_revision(revision: i64) -> StoreResult<Revision> {
    Revision::try_from(revision)
        .map_err(|_| StoreError::backend(format!("stored revision {revision} is negative")))
}

fn to_db_revision(revision: Revision) -> StoreResult<i64> {
    i64::try_from(revision)
        .map_err(|_| StoreError::InvalidBatch(format!("revision {revision} out of range")))
}

/// Postgres-backed store. Each batch runs in a single transaction; the
/// `zoo_animals` join table enforces the one-zoo-per-animal rule with a
/// unique constraint. Relationship constraints are deferred to commit so
/// operation order inside a batch does not matter.
#[derive(Clone)]
pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// [`StoreError::Backend`] if the pool cannot connect.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Backend(format!("connection failed: {e}")))?;

        info!("Database connection pool created successfully");
        Ok(Self { pool })
    }

    /// Create tables and indexes if they do not exist
    ///
    /// # Errors
    ///
    /// [`StoreError::Backend`] if a DDL statement fails.
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Entity store schema is up to date");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn load_animal_lists(&self, zoos: &[Uuid]) -> StoreResult<HashMap<Uuid, Vec<AnimalId>>> {
        let rows = sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT zoo_id, animal_id FROM zoo_animals WHERE zoo_id = ANY($1) ORDER BY zoo_id, position",
        )
        .bind(zoos)
        .fetch_all(&self.pool)
        .await?;

        let mut lists: HashMap<Uuid, Vec<AnimalId>> = HashMap::new();
        for (zoo_id, animal_id) in rows {
            lists.entry(zoo_id).or_default().push(AnimalId::from(animal_id));
        }
        Ok(lists)
    }

    async fn hydrate(&self, rows: Vec<ZooRow>) -> StoreResult<Vec<Zoo>> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut lists = self.load_animal_lists(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let animals = lists.remove(&row.id).unwrap_or_default();
                row.into_zoo(animals)
            })
            .collect()
    }

    async fn stale_or_missing(
        tx: &mut Transaction<'_, Postgres>,
        key: EntityKey,
        expected: Revision,
    ) -> StoreResult<StoreError> {
        let (table, id) = match key {
            EntityKey::Animal(id) => ("animals", id.as_uuid()),
            EntityKey::Zoo(id) => ("zoos", id.as_uuid()),
        };
        let found: Option<i64> = sqlx::query_scalar(&format!("SELECT revision FROM {table} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(match found {
            None => StoreError::NotFound(key),
            Some(found) => StoreError::Conflict {
                key,
                expected,
                found: from_db_revision(found)?,
            },
        })
    }

    async fn write_species_list(tx: &mut Transaction<'_, Postgres>, zoo: &Zoo) -> StoreResult<()> {
        sqlx::query("DELETE FROM zoo_animals WHERE zoo_id = $1")
            .bind(zoo.id.as_uuid())
            .execute(&mut **tx)
            .await?;

        for (position, animal) in zoo.animals.iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| StoreError::InvalidBatch("species-list too long".to_string()))?;
            sqlx::query("INSERT INTO zoo_animals (zoo_id, animal_id, position) VALUES ($1, $2, $3)")
                .bind(zoo.id.as_uuid())
                .bind(animal.as_uuid())
                .bind(position)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    async fn apply(tx: &mut Transaction<'_, Postgres>, op: WriteOp, committed: &mut Committed) -> StoreResult<()> {
        let key = op.key();
        match op {
            WriteOp::InsertAnimal(mut animal) => {
                let inserted = sqlx::query(
                    r"INSERT INTO animals (id, owner_id, species, population, consumption_class, checked_in, revision, created_at, updated_at)
                      VALUES ($1, $2, $3, $4, $5, $6, 1, $7, $8)
                      ON CONFLICT (id) DO NOTHING",
                )
                .bind(animal.id.as_uuid())
                .bind(animal.owner.as_str())
                .bind(&animal.species)
                .bind(animal.population)
                .bind(&animal.consumption_class)
                .bind(animal.checked_in)
                .bind(animal.created_at)
                .bind(animal.updated_at)
                .execute(&mut **tx)
                .await?;

                if inserted.rows_affected() == 0 {
                    return Err(Self::stale_or_missing(tx, key, 0).await?);
                }
                animal.revision = 1;
                committed.animals.push(animal);
            }
            WriteOp::PutAnimal(mut animal) => {
                let updated: Option<(i64, DateTime<Utc>)> = sqlx::query_as(
                    r"UPDATE animals
                      SET species = $3, population = $4, consumption_class = $5, checked_in = $6,
                          revision = revision + 1, updated_at = NOW()
                      WHERE id = $1 AND revision = $2
                      RETURNING revision, updated_at",
                )
                .bind(animal.id.as_uuid())
                .bind(to_db_revision(animal.revision)?)
                .bind(&animal.species)
                .bind(animal.population)
                .bind(&animal.consumption_class)
                .bind(animal.checked_in)
                .fetch_optional(&mut **tx)
                .await?;

                let Some((revision, updated_at)) = updated else {
                    return Err(Self::stale_or_missing(tx, key, animal.revision).await?);
                };
                animal.revision = from_db_revision(revision)?;
                animal.updated_at = updated_at;
                committed.animals.push(animal);
            }
            WriteOp::DeleteAnimal { id, revision } => {
                let deleted = sqlx::query("DELETE FROM animals WHERE id = $1 AND revision = $2")
                    .bind(id.as_uuid())
                    .bind(to_db_revision(revision)?)
                    .execute(&mut **tx)
                    .await?;
                if deleted.rows_affected() == 0 {
                    return Err(Self::stale_or_missing(tx, key, revision).await?);
                }
                committed.deleted.push(key);
            }
            WriteOp::InsertZoo(mut zoo) => {
                zoo.dedup_animals();
                let inserted = sqlx::query(
                    r"INSERT INTO zoos (id, owner_id, name, city, state, size, admission, revision, created_at, updated_at)
                      VALUES ($1, $2, $3, $4, $5, $6, $7, 1, $8, $9)
                      ON CONFLICT (id) DO NOTHING",
                )
                .bind(zoo.id.as_uuid())
                .bind(zoo.owner.as_str())
                .bind(&zoo.name)
                .bind(&zoo.city)
                .bind(&zoo.state)
                .bind(&zoo.size)
                .bind(zoo.admission)
                .bind(zoo.created_at)
                .bind(zoo.updated_at)
                .execute(&mut **tx)
                .await?;

                if inserted.rows_affected() == 0 {
                    return Err(Self::stale_or_missing(tx, key, 0).await?);
                }
                Self::write_species_list(tx, &zoo).await?;
                zoo.revision = 1;
                committed.zoos.push(zoo);
            }
            WriteOp::PutZoo(mut zoo) => {
                zoo.dedup_animals();
                let updated: Option<(i64, DateTime<Utc>)> = sqlx::query_as(
                    r"UPDATE zoos
                      SET name = $3, city = $4, state = $5, size = $6, admission = $7,
                          revision = revision + 1, updated_at = NOW()
                      WHERE id = $1 AND revision = $2
                      RETURNING revision, updated_at",
                )
                .bind(zoo.id.as_uuid())
                .bind(to_db_revision(zoo.revision)?)
                .bind(&zoo.name)
                .bind(&zoo.city)
                .bind(&zoo.state)
                .bind(&zoo.size)
                .bind(zoo.admission)
                .fetch_optional(&mut **tx)
                .await?;

                let Some((revision, updated_at)) = updated else {
                    return Err(Self::stale_or_missing(tx, key, zoo.revision).await?);
                };
                Self::write_species_list(tx, &zoo).await?;
                zoo.revision = from_db_revision(revision)?;
                zoo.updated_at = updated_at;
                committed.zoos.push(zoo);
            }
            WriteOp::DeleteZoo { id, revision } => {
                let deleted = sqlx::query("DELETE FROM zoos WHERE id = $1 AND revision = $2")
                    .bind(id.as_uuid())
                    .bind(to_db_revision(revision)?)
                    .execute(&mut **tx)
                    .await?;
                if deleted.rows_affected() == 0 {
                    return Err(Self::stale_or_missing(tx, key, revision).await?);
                }
                committed.deleted.push(key);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore for PgEntityStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn get_animal(&self, id: AnimalId) -> StoreResult<Option<Animal>> {
        let row = sqlx::query_as::<_, AnimalRow>("SELECT * FROM animals WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Animal::try_from).transpose()
    }

    async fn get_zoo(&self, id: ZooId) -> StoreResult<Option<Zoo>> {
        let row = sqlx::query_as::<_, ZooRow>("SELECT * FROM zoos WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        let zoos = self.hydrate(row.into_iter().collect()).await?;
        Ok(zoos.into_iter().next())
    }

    async fn query_animals(&self, query: &AnimalQuery) -> StoreResult<Vec<Animal>> {
        let rows = sqlx::query_as::<_, AnimalRow>(
            r"SELECT * FROM animals
              WHERE ($1::text IS NULL OR owner_id = $1)
                AND ($2::text IS NULL OR species = $2)
                AND ($3::bool IS NULL OR checked_in = $3)
              ORDER BY created_at, id",
        )
        .bind(query.owner.as_ref().map(UserId::as_str))
        .bind(query.species.as_deref())
        .bind(query.checked_in)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Animal::try_from).collect()
    }

    async fn query_zoos(&self, query: &ZooQuery) -> StoreResult<Vec<Zoo>> {
        let rows = sqlx::query_as::<_, ZooRow>(
            r"SELECT z.* FROM zoos z
              WHERE ($1::text IS NULL OR z.owner_id = $1)
                AND ($2::uuid IS NULL OR EXISTS (
                    SELECT 1 FROM zoo_animals za WHERE za.zoo_id = z.id AND za.animal_id = $2
                ))
              ORDER BY z.created_at, z.id",
        )
        .bind(query.owner.as_ref().map(UserId::as_str))
        .bind(query.holding.map(|id| id.as_uuid()))
        .fetch_all(&self.pool)
        .await?;
        self.hydrate(rows).await
    }

    async fn commit(&self, batch: WriteBatch) -> StoreResult<Committed> {
        batch.check_keys()?;

        let operations = batch.len();
        let mut tx = self.pool.begin().await?;
        let mut committed = Committed::default();
        for op in batch.into_ops() {
            Self::apply(&mut tx, op, &mut committed).await?;
        }
        tx.commit().await?;

        debug!(operations, "Committed write batch");
        Ok(committed)
    }

    async fn wipe(&self) -> StoreResult<()> {
        sqlx::query("TRUNCATE zoo_animals, zoos, animals")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
