use std::sync::Arc;

use tracing::debug;

use crate::error::{IdentityError, Result};
use crate::models::{BearerToken, UserId};
use crate::provider::IdentityProvider;
use crate::session::SessionRegistry;

/// Turns the credential presented with a request into the caller's [`UserId`].
///
/// Only tokens with a live session are introspected; every call hits the
/// provider once, with no caching and no retries.
#[derive(Clone)]
pub struct IdentityResolver {
    sessions: Arc<SessionRegistry>,
    provider: Arc<dyn IdentityProvider>,
}

impl IdentityResolver {
    pub fn new(sessions: Arc<SessionRegistry>, provider: Arc<dyn IdentityProvider>) -> Self {
        Self { sessions, provider }
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// # Errors
    ///
    /// [`IdentityError::NoSession`] when no token is given or it has no live
    /// session; otherwise whatever the provider reports.
    pub async fn resolve(&self, token: Option<&BearerToken>) -> Result<UserId> {
        let token = token.ok_or(IdentityError::NoSession)?;
        if !self.sessions.is_active(token) {
            debug!(token = %token.fingerprint(), "Credential has no active session");
            return Err(IdentityError::NoSession);
        }
        self.provider.introspect(token).await
    }
}
