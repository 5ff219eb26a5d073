//! Caller identity extraction
//!
//! Handlers that take an [`AuthContext`] only run for requests whose bearer
//! token was issued by `/oauth`, is still registered, and is accepted by the
//! identity provider. Everything else is rejected with 401 before the handler.

use async_trait::async_trait;
use auth_identity::{BearerToken, UserId};
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};

use crate::error::ApiError;
use crate::server::MenagerieServer;

/// The resolved caller of a request
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: UserId,
}

/// Bearer token from the `Authorization` header, if well formed
pub fn bearer_token(headers: &HeaderMap) -> Option<BearerToken> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(BearerToken::from_authorization_header)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    MenagerieServer: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let server = MenagerieServer::from_ref(state);
        let token = bearer_token(&parts.headers);
        let user_id = server.identity().resolve(token.as_ref()).await?;
        Ok(Self { user_id })
    }
}
