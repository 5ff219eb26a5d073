//! Common error handling for Menagerie
//!
//! Process-level failures (configuration, bootstrap, listener setup) are
//! reported as [`MenagerieError`]. Request-level failures live in the
//! server's `ApiError`, which tags its log lines with the stable codes
//! from [`codes`].
//!
//! # Example
//!
//! ```rust
//! use error_common::{MenagerieError, Result};
//!
//! fn parse_port(raw: &str) -> Result<u16> {
//!     raw.parse()
//!         .map_err(|_| MenagerieError::ConfigError(format!("invalid port: {raw}")))
//! }
//!
//! assert!(parse_port("8080").is_ok());
//! assert!(parse_port("http").is_err());
//! ```

pub mod codes;
pub mod types;

pub use types::*;
