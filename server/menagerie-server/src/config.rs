//! Layered server configuration
//!
//! Precedence, lowest first: built-in defaults, the optional YAML file given
//! with `--config`, then `MENAGERIE__SECTION__KEY` environment variables.

use std::path::Path;

use auth_identity::IdentityConfig;
use auth_oauth::OAuthConfig;
use config::{Config, Environment, File, Map};
use error_common::{MenagerieError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ListenConfig,
    pub store: StoreConfig,
    pub oauth: OAuthConfig,
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
    /// Mount the unauthenticated `DELETE /delete` maintenance route
    pub enable_wipe: bool,
    pub request_timeout_secs: u64,
    pub cors_origins: Vec<String>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_wipe: true,
            request_timeout_secs: 30,
            cors_origins: vec![
                "http://localhost:8080".to_string(),
                "http://localhost:3000".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database_url: Option<String>,
}

fn config_error(error: impl std::fmt::Display) -> MenagerieError {
    MenagerieError::ConfigError(error.to_string())
}

impl ServerConfig {
    /// Load defaults, then the file (if it exists), then the environment
    ///
    /// # Errors
    ///
    /// [`MenagerieError::ConfigError`] if a source cannot be parsed or the
    /// merged result fails [`ServerConfig::validate`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// `env` replaces the process environment when given
    fn load_with_env(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let defaults = Config::try_from(&Self::default()).map_err(config_error)?;
        let mut builder = Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        let config: Self = builder
            .add_source(
                Environment::with_prefix("MENAGERIE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("oauth.scopes")
                    .with_list_parse_key("server.cors_origins")
                    .source(env),
            )
            .build()
            .map_err(config_error)?
            .try_deserialize()
            .map_err(config_error)?;

        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// [`MenagerieError::ConfigError`] naming the first offending setting.
    pub fn validate(&self) -> Result<()> {
        if self.store.backend == StoreBackend::Postgres
            && self.store.database_url.as_deref().map_or(true, str::is_empty)
        {
            return Err(config_error("store.database_url is required for the postgres backend"));
        }
        if self.oauth.client_id.trim().is_empty() {
            return Err(config_error("oauth.client_id must be set"));
        }
        if self.oauth.state_ttl_secs == 0 {
            return Err(config_error("oauth.state_ttl_secs must be positive"));
        }
        if self.identity.user_id_field.trim().is_empty() {
            return Err(config_error("identity.user_id_field must be set"));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(config_error("server.request_timeout_secs must be positive"));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.oauth.client_id = "client".to_string();
        config
    }

    #[test]
    fn defaults_target_google() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.oauth.token_url, "https://www.googleapis.com/oauth2/v4/token");
        assert_eq!(config.oauth.scopes, vec!["email".to_string()]);
        assert_eq!(config.identity.user_id_field, "id");
    }

    #[test]
    fn missing_client_id_is_rejected() {
        let err = ServerConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("oauth.client_id"));
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn postgres_requires_database_url() {
        let mut config = valid();
        config.store.backend = StoreBackend::Postgres;
        assert!(config.validate().is_err());

        config.store.database_url = Some("postgres://localhost/menagerie".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("menagerie-{}.yaml", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "server:\n  port: 9191\n  enable_wipe: false\noauth:\n  client_id: from-file\nidentity:\n  user_id_field: sub"
        )
        .unwrap();

        let config = ServerConfig::load_with_env(Some(&path), Some(Map::new())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.server.port, 9191);
        assert!(!config.server.enable_wipe);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.oauth.client_id, "from-file");
        assert_eq!(config.identity.user_id_field, "sub");
        assert_eq!(config.oauth.state_ttl_secs, 600);
    }

    #[test]
    fn missing_file_leaves_defaults_which_fail_validation() {
        let path = std::env::temp_dir().join("menagerie-does-not-exist.yaml");
        let err = ServerConfig::load_with_env(Some(&path), Some(Map::new())).unwrap_err();
        // defaults alone lack a client id
        assert!(matches!(err, MenagerieError::ConfigError(ref message) if message.contains("oauth.client_id")));
    }

    #[test]
    fn environment_overrides_file_and_defaults() {
        let env = Map::from([
            ("MENAGERIE__OAUTH__CLIENT_ID".to_string(), "from-env".to_string()),
            ("MENAGERIE__SERVER__PORT".to_string(), "7070".to_string()),
            ("MENAGERIE__OAUTH__SCOPES".to_string(), "email,profile".to_string()),
        ]);
        let path = std::env::temp_dir().join("menagerie-does-not-exist.yaml");
        let config = ServerConfig::load_with_env(Some(&path), Some(env)).unwrap();

        assert_eq!(config.oauth.client_id, "from-env");
        assert_eq!(config.server.port, 7070);
        assert_eq!(config.oauth.scopes, vec!["email".to_string(), "profile".to_string()]);
    }
}
