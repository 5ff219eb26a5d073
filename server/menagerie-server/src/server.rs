use std::sync::Arc;
use std::time::Instant;

use auth_identity::{HttpIdentityProvider, IdentityProvider, IdentityResolver, SessionRegistry};
use auth_oauth::LoginFlow;
use entity_store::{EntityStore, InMemoryEntityStore};
use error_common::{MenagerieError, Result};
use tracing::info;

use crate::config::{ServerConfig, StoreBackend, StoreConfig};
use crate::services::{AccessGuard, AnimalService, RelationshipService, ZooService};

/// Main Menagerie server state, shared by every handler
#[derive(Clone)]
pub struct MenagerieServer {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    store: Arc<dyn EntityStore>,
    identity: IdentityResolver,
    login: Arc<LoginFlow>,
    animals: AnimalService,
    zoos: ZooService,
    started_at: Instant,
}

impl MenagerieServer {
    /// Wire the services around an already opened store and identity provider
    ///
    /// # Errors
    ///
    /// `ConfigError` when the OAuth endpoints cannot be parsed.
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn EntityStore>,
        provider: Arc<dyn IdentityProvider>,
    ) -> Result<Self> {
        let sessions = Arc::new(SessionRegistry::new());
        let identity = IdentityResolver::new(Arc::clone(&sessions), provider);
        let login = LoginFlow::new(&config.oauth, sessions)
            .map_err(|e| MenagerieError::ConfigError(e.to_string()))?;

        let guard = AccessGuard::new(Arc::clone(&store));
        let relationships = RelationshipService::new(Arc::clone(&store), guard.clone());
        let animals = AnimalService::new(Arc::clone(&store), guard.clone(), relationships.clone());
        let zoos = ZooService::new(Arc::clone(&store), guard, relationships);

        Ok(Self {
            config: Arc::new(config),
            store,
            identity,
            login: Arc::new(login),
            animals,
            zoos,
            started_at: Instant::now(),
        })
    }

    /// Open the configured store and the HTTP identity provider
    ///
    /// # Errors
    ///
    /// Store connection or migration failures, or an unusable provider setup.
    pub async fn from_config(config: ServerConfig) -> Result<Self> {
        let store = open_store(&config.store).await?;
        let provider = HttpIdentityProvider::new(config.identity.clone())
            .map_err(|e| MenagerieError::NetworkError(e.to_string()))?;
        Self::new(config, store, Arc::new(provider))
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    pub fn identity(&self) -> &IdentityResolver {
        &self.identity
    }

    pub fn login(&self) -> &LoginFlow {
        &self.login
    }

    /// Tokens issued by `/oauth` and not yet revoked
    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        self.identity.sessions()
    }

    pub fn animals(&self) -> &AnimalService {
        &self.animals
    }

    pub fn zoos(&self) -> &ZooService {
        &self.zoos
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

async fn open_store(config: &StoreConfig) -> Result<Arc<dyn EntityStore>> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory entity store");
            Ok(Arc::new(InMemoryEntityStore::new()))
        }
        #[cfg(feature = "postgres")]
        StoreBackend::Postgres => {
            let url = config.database_url.as_deref().ok_or_else(|| {
                MenagerieError::ConfigError("store.database_url is required for postgres".to_string())
            })?;
            let store = entity_store::PgEntityStore::connect(url)
                .await
                .map_err(|e| MenagerieError::StorageError(e.to_string()))?;
            store
                .migrate()
                .await
                .map_err(|e| MenagerieError::StorageError(e.to_string()))?;
            info!("Using postgres entity store");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "postgres"))]
        StoreBackend::Postgres => Err(MenagerieError::ConfigError(
            "built without postgres support; rebuild with --features postgres".to_string(),
        )),
    }
}
