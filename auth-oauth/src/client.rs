use std::time::Duration;

use auth_identity::BearerToken;
use oauth2::basic::BasicClient;
use oauth2::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use oauth2::url::Url;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, HttpRequest,
    HttpResponse, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

use crate::config::OAuthConfig;
use crate::error::{OAuthError, Result};

/// Response of the provider's authorization endpoint, relayed to the browser
#[derive(Debug, Clone)]
pub struct ProviderPage {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

/// Client registration at one OAuth provider
pub struct OAuthClient {
    oauth: BasicClient,
    http: reqwest::Client,
    scopes: Vec<String>,
}

impl OAuthClient {
    /// # Errors
    ///
    /// [`OAuthError::Configuration`] for malformed endpoint URLs or a client
    /// that cannot be built.
    pub fn new(config: &OAuthConfig) -> Result<Self> {
        let auth_url = AuthUrl::new(config.authorization_url.clone())
            .map_err(|e| OAuthError::Configuration(format!("authorization_url: {e}")))?;
        let token_url = TokenUrl::new(config.token_url.clone())
            .map_err(|e| OAuthError::Configuration(format!("token_url: {e}")))?;
        let redirect_url = RedirectUrl::new(config.redirect_url.clone())
            .map_err(|e| OAuthError::Configuration(format!("redirect_url: {e}")))?;

        let oauth = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            auth_url,
            Some(token_url),
        )
        .set_auth_type(AuthType::RequestBody)
        .set_redirect_uri(redirect_url);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OAuthError::Configuration(format!("http client: {e}")))?;

        Ok(Self {
            oauth,
            http,
            scopes: config.scopes.clone(),
        })
    }

    /// Authorization URL (`response_type=code`) carrying the given state
    pub fn authorization_url(&self, state: &str) -> Url {
        let state = state.to_string();
        let (url, _) = self
            .oauth
            .authorize_url(move || CsrfToken::new(state))
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .url();
        url
    }

    /// GET the authorization URL and capture whatever the provider answers
    ///
    /// # Errors
    ///
    /// [`OAuthError::ExternalProviderError`] if the provider cannot be reached.
    pub async fn fetch_page(&self, url: &Url) -> Result<ProviderPage> {
        let response = self
            .http
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| OAuthError::ExternalProviderError(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| OAuthError::ExternalProviderError(e.to_string()))?;

        Ok(ProviderPage {
            status,
            content_type,
            body,
        })
    }

    /// Exchange an authorization code for an access token
    ///
    /// # Errors
    ///
    /// [`OAuthError::TokenExchange`] if the token endpoint fails or refuses.
    pub async fn exchange_code(&self, code: &str) -> Result<BearerToken> {
        let http = self.http.clone();
        let token = self
            .oauth
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(move |request| send_token_request(http, request))
            .await
            .map_err(|e| OAuthError::TokenExchange(e.to_string()))?;

        Ok(BearerToken::new(token.access_token().secret().clone()))
    }
}

/// Transport failure of a token endpoint call
#[derive(Error, Debug)]
enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("unusable token endpoint exchange: {0}")]
    Malformed(String),
}

/// Send an `oauth2` token request through the timeout-bounded client
async fn send_token_request(
    http: reqwest::Client,
    request: HttpRequest,
) -> std::result::Result<HttpResponse, TransportError> {
    let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
        .map_err(|e| TransportError::Malformed(e.to_string()))?;

    let mut builder = http.request(method, request.url.as_str());
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_bytes());
    }
    let response = builder.body(request.body).send().await?;

    let status_code = StatusCode::from_u16(response.status().as_u16())
        .map_err(|e| TransportError::Malformed(e.to_string()))?;
    let mut headers = HeaderMap::new();
    for (name, value) in response.headers() {
        let name = HeaderName::from_bytes(name.as_str().as_bytes())
            .map_err(|e| TransportError::Malformed(e.to_string()))?;
        let value = HeaderValue::from_bytes(value.as_bytes())
            .map_err(|e| TransportError::Malformed(e.to_string()))?;
        headers.append(name, value);
    }
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}
