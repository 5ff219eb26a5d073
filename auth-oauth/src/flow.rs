use std::sync::Arc;

use auth_identity::{BearerToken, SessionRegistry};
use chrono::Duration;
use oauth2::url::Url;
use tracing::{debug, info, warn};

use crate::client::{OAuthClient, ProviderPage};
use crate::config::OAuthConfig;
use crate::error::{OAuthError, Result};
use crate::state::LoginStateStore;

/// Outcome of starting a login
#[derive(Debug)]
pub struct LoginAttempt {
    pub state: String,
    pub authorization_url: Url,
    pub page: ProviderPage,
}

/// Authorization-code login bound to the server's session registry
pub struct LoginFlow {
    client: OAuthClient,
    states: LoginStateStore,
    sessions: Arc<SessionRegistry>,
}

impl LoginFlow {
    /// # Errors
    ///
    /// [`OAuthError::Configuration`] if the provider settings are unusable.
    pub fn new(config: &OAuthConfig, sessions: Arc<SessionRegistry>) -> Result<Self> {
        let ttl = i64::try_from(config.state_ttl_secs)
            .map(Duration::seconds)
            .map_err(|_| OAuthError::Configuration("state_ttl_secs out of range".to_string()))?;

        Ok(Self {
            client: OAuthClient::new(config)?,
            states: LoginStateStore::new(ttl),
            sessions,
        })
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Issue a state and fetch the provider's authorization page for it
    ///
    /// # Errors
    ///
    /// [`OAuthError::ExternalProviderError`] if the provider is unreachable.
    pub async fn begin(&self) -> Result<LoginAttempt> {
        let purged = self.states.purge_expired();
        if purged > 0 {
            debug!(purged, "Discarded expired login states");
        }

        let state = self.states.issue();
        let authorization_url = self.client.authorization_url(&state);
        debug!(url = %authorization_url, "Fetching provider authorization page");

        let page = self.client.fetch_page(&authorization_url).await?;
        Ok(LoginAttempt {
            state,
            authorization_url,
            page,
        })
    }

    /// Validate the redirect parameters, exchange the code and open a session
    ///
    /// # Errors
    ///
    /// - [`OAuthError::AccessDenied`] when the provider reports an error
    /// - [`OAuthError::InvalidState`] for an unknown, expired or reused state
    /// - [`OAuthError::InvalidRequest`] when no code is present
    /// - [`OAuthError::TokenExchange`] when the token endpoint fails
    pub async fn complete(
        &self,
        state: Option<&str>,
        code: Option<&str>,
        provider_error: Option<&str>,
    ) -> Result<BearerToken> {
        if let Some(reason) = provider_error {
            if let Some(state) = state {
                self.states.consume(state);
            }
            warn!(reason, "Provider refused authorization");
            return Err(OAuthError::AccessDenied(reason.to_string()));
        }

        let state = state.ok_or(OAuthError::InvalidState)?;
        if !self.states.consume(state) {
            return Err(OAuthError::InvalidState);
        }

        let code = code
            .filter(|code| !code.is_empty())
            .ok_or_else(|| OAuthError::InvalidRequest("missing authorization code".to_string()))?;

        let token = self.client.exchange_code(code).await?;
        self.sessions.register(&token);
        info!(token = %token.fingerprint(), "Session opened");
        Ok(token)
    }

    /// Revoke the presented token; returns whether a session was closed
    pub fn logout(&self, token: Option<&BearerToken>) -> bool {
        let Some(token) = token else {
            return false;
        };
        let revoked = self.sessions.revoke(token);
        if revoked {
            info!(token = %token.fingerprint(), "Session closed");
        }
        revoked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn flow_for(server: &MockServer) -> LoginFlow {
        let config = OAuthConfig {
            client_id: "client-123".to_string(),
            client_secret: "shh".to_string(),
            authorization_url: format!("{}/auth", server.uri()),
            token_url: format!("{}/token", server.uri()),
            redirect_url: "http://localhost:8080/oauth".to_string(),
            ..OAuthConfig::default()
        };
        LoginFlow::new(&config, Arc::new(SessionRegistry::new())).unwrap()
    }

    #[tokio::test]
    async fn begin_fetches_consent_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth"))
            .and(query_param("response_type", "code"))
            .and(query_param("client_id", "client-123"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string("<html>consent</html>"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let flow = flow_for(&server);
        let attempt = flow.begin().await.unwrap();
        assert_eq!(attempt.page.status, 200);
        assert_eq!(attempt.page.body, "<html>consent</html>");
        assert_eq!(attempt.page.content_type.as_deref(), Some("text/html"));
        assert_eq!(attempt.state.len(), 15);
        assert!(attempt
            .authorization_url
            .query_pairs()
            .any(|(k, v)| k == "state" && v == attempt.state));
    }

    #[tokio::test]
    async fn begin_passes_provider_errors_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_client"))
            .mount(&server)
            .await;

        let attempt = flow_for(&server).begin().await.unwrap();
        assert_eq!(attempt.page.status, 400);
        assert_eq!(attempt.page.body, "invalid_client");
    }

    #[tokio::test]
    async fn complete_exchanges_code_and_registers_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=the-code"))
            .and(body_string_contains("client_secret=shh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json_body()))
            .expect(1)
            .mount(&server)
            .await;

        let flow = flow_for(&server);
        let attempt = flow.begin().await.unwrap();
        let token = flow
            .complete(Some(&attempt.state), Some("the-code"), None)
            .await
            .unwrap();

        assert_eq!(token.expose(), "ya29.issued");
        assert!(flow.sessions().is_active(&token));

        // state is single use
        let err = flow
            .complete(Some(&attempt.state), Some("the-code"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::InvalidState));
    }

    #[tokio::test]
    async fn unknown_state_is_rejected_before_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json_body()))
            .expect(0)
            .mount(&server)
            .await;

        let flow = flow_for(&server);
        let err = flow.complete(Some("FORGED"), Some("code"), None).await.unwrap_err();
        assert!(matches!(err, OAuthError::InvalidState));
        let err = flow.complete(None, Some("code"), None).await.unwrap_err();
        assert!(matches!(err, OAuthError::InvalidState));
    }

    #[tokio::test]
    async fn token_endpoint_failure_is_exchange_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let flow = flow_for(&server);
        let attempt = flow.begin().await.unwrap();
        let err = flow
            .complete(Some(&attempt.state), Some("code"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::TokenExchange(_)));
        assert!(flow.sessions().is_empty());
    }

    #[tokio::test]
    async fn hung_token_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json_body())
                    .set_delay(std::time::Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let config = OAuthConfig {
            client_id: "client-123".to_string(),
            authorization_url: format!("{}/auth", server.uri()),
            token_url: format!("{}/token", server.uri()),
            timeout_secs: 1,
            ..OAuthConfig::default()
        };
        let flow = LoginFlow::new(&config, Arc::new(SessionRegistry::new())).unwrap();
        let attempt = flow.begin().await.unwrap();

        let started = std::time::Instant::now();
        let err = flow
            .complete(Some(&attempt.state), Some("code"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::TokenExchange(_)));
        assert!(started.elapsed() < std::time::Duration::from_secs(4));
        assert!(flow.sessions().is_empty());
    }

    #[tokio::test]
    async fn provider_denial_is_reported() {
        let server = MockServer::start().await;
        let flow = flow_for(&server);
        let err = flow
            .complete(Some("ANY"), None, Some("access_denied"))
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::AccessDenied(reason) if reason == "access_denied"));
    }

    #[test]
    fn logout_revokes_only_live_sessions() {
        let server_uri = "http://127.0.0.1:1";
        let config = OAuthConfig {
            authorization_url: format!("{server_uri}/auth"),
            token_url: format!("{server_uri}/token"),
            ..OAuthConfig::default()
        };
        let flow = LoginFlow::new(&config, Arc::new(SessionRegistry::new())).unwrap();
        let token = BearerToken::new("live");
        flow.sessions().register(&token);

        assert!(!flow.logout(None));
        assert!(flow.logout(Some(&token)));
        assert!(!flow.logout(Some(&token)));
    }

    fn serde_json_body() -> serde_json::Value {
        serde_json::json!({
            "access_token": "ya29.issued",
            "token_type": "Bearer",
            "expires_in": 3599
        })
    }
}
