use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::IdentityConfig;
use crate::error::{IdentityError, Result};
use crate::models::{BearerToken, UserId};

/// Resolves a bearer token to the user it was issued to
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn introspect(&self, token: &BearerToken) -> Result<UserId>;
}

/// Introspects tokens against an OAuth userinfo endpoint
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    config: IdentityConfig,
}

impl HttpIdentityProvider {
    /// # Errors
    ///
    /// Returns [`IdentityError::Configuration`] if the HTTP client cannot be built.
    pub fn new(config: IdentityConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IdentityError::Configuration(format!("userinfo client: {e}")))?;

        Ok(Self { client, config })
    }

    fn extract_user_id(&self, document: &Value) -> Result<UserId> {
        match document.get(&self.config.user_id_field) {
            Some(Value::String(id)) if !id.is_empty() => Ok(UserId::new(id.clone())),
            Some(Value::Number(id)) => Ok(UserId::new(id.to_string())),
            _ => Err(IdentityError::MalformedResponse(format!(
                "field '{}' missing from userinfo document",
                self.config.user_id_field
            ))),
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn introspect(&self, token: &BearerToken) -> Result<UserId> {
        let response = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(|e| {
                warn!(token = %token.fingerprint(), error = %e, "Userinfo request failed");
                IdentityError::Upstream(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(token = %token.fingerprint(), status = status.as_u16(), "Userinfo request rejected");
            return Err(IdentityError::Upstream(format!(
                "userinfo endpoint returned {status}"
            )));
        }

        let document: Value = response
            .json()
            .await
            .map_err(|e| IdentityError::MalformedResponse(e.to_string()))?;

        let user_id = self.extract_user_id(&document)?;
        debug!(token = %token.fingerprint(), user_id = %user_id, "Token introspected");
        Ok(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer, field: &str) -> HttpIdentityProvider {
        HttpIdentityProvider::new(IdentityConfig {
            userinfo_url: format!("{}/userinfo", server.uri()),
            user_id_field: field.to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn reads_configured_id_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header("authorization", "Bearer good-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": "109876", "email": "keeper@example.com"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server, "id");
        let user = provider.introspect(&BearerToken::new("good-token")).await.unwrap();
        assert_eq!(user, UserId::new("109876"));
    }

    #[tokio::test]
    async fn numeric_ids_are_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sub": 42})))
            .mount(&server)
            .await;

        let provider = provider_for(&server, "sub");
        let user = provider.introspect(&BearerToken::new("t")).await.unwrap();
        assert_eq!(user.as_str(), "42");
    }

    #[tokio::test]
    async fn rejected_token_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = provider_for(&server, "id");
        let err = provider.introspect(&BearerToken::new("expired")).await.unwrap_err();
        assert!(matches!(err, IdentityError::Upstream(_)));
    }

    #[tokio::test]
    async fn missing_field_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"email": "x@y.z"})))
            .mount(&server)
            .await;

        let provider = provider_for(&server, "id");
        let err = provider.introspect(&BearerToken::new("t")).await.unwrap_err();
        assert!(matches!(err, IdentityError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_provider_is_upstream_error() {
        let provider = HttpIdentityProvider::new(IdentityConfig {
            userinfo_url: "http://127.0.0.1:9/userinfo".to_string(),
            user_id_field: "id".to_string(),
            timeout_secs: 1,
        })
        .unwrap();

        let err = provider.introspect(&BearerToken::new("t")).await.unwrap_err();
        assert!(matches!(err, IdentityError::Upstream(_)));
    }
}
