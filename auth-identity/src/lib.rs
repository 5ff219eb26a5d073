//! Identity resolution for Menagerie
//!
//! A caller proves who they are with a bearer token obtained through the
//! OAuth login flow. This crate keeps track of which tokens were issued by
//! this server ([`SessionRegistry`]) and turns a live token into a stable
//! [`UserId`] by asking the identity provider's userinfo endpoint
//! ([`HttpIdentityProvider`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use auth_identity::{
//!     BearerToken, HttpIdentityProvider, IdentityConfig, IdentityResolver, SessionRegistry,
//! };
//!
//! # async fn run() -> Result<(), auth_identity::IdentityError> {
//! let sessions = Arc::new(SessionRegistry::new());
//! let provider = Arc::new(HttpIdentityProvider::new(IdentityConfig::default())?);
//! let resolver = IdentityResolver::new(sessions.clone(), provider);
//!
//! let token = BearerToken::new("ya29.token-from-oauth");
//! sessions.register(&token);
//! let user = resolver.resolve(Some(&token)).await?;
//! println!("request made by {user}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod provider;
pub mod resolver;
pub mod session;

pub use config::IdentityConfig;
pub use error::{IdentityError, Result};
pub use models::{BearerToken, UserId};
pub use provider::{HttpIdentityProvider, IdentityProvider};
pub use resolver::IdentityResolver;
pub use session::{Session, SessionRegistry};
