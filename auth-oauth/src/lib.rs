//! OAuth 2.0 authorization-code login for Menagerie
//!
//! [`LoginFlow`] drives the three steps a browser goes through:
//!
//! 1. `begin`: remember a fresh random state and fetch the provider's
//!    authorization page for it
//! 2. `complete`: check the returned state, exchange the code for an access
//!    token and register that token as a session
//! 3. `logout`: revoke the session again
//!
//! The token endpoint exchange is done with the `oauth2` crate; client
//! credentials are sent in the form body.

pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod state;

pub use client::{OAuthClient, ProviderPage};
pub use config::OAuthConfig;
pub use error::{OAuthError, Result};
pub use flow::{LoginAttempt, LoginFlow};
pub use state::LoginStateStore;
