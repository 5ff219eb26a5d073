//! Shared harness: an in-memory server whose identity provider maps fixed
//! tokens to users, driven through `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use auth_identity::{BearerToken, IdentityError, IdentityProvider, UserId};
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use entity_store::{EntityStore, InMemoryEntityStore};
use menagerie_server::{create_app, MenagerieServer, ServerConfig};
use serde_json::Value;
use tower::ServiceExt;

pub const ALICE: &str = "alice-token";
pub const BOB: &str = "bob-token";

/// Resolves tokens from a fixed table, like a provider that knows every user
pub struct FakeIdentityProvider {
    users: HashMap<String, String>,
}

impl FakeIdentityProvider {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            users: entries
                .iter()
                .map(|(token, user)| ((*token).to_string(), (*user).to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn introspect(&self, token: &BearerToken) -> auth_identity::Result<UserId> {
        self.users
            .get(token.expose())
            .map(|user| UserId::new(user.clone()))
            .ok_or_else(|| IdentityError::Upstream("unknown token".to_string()))
    }
}

pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.oauth.client_id = "menagerie-test".to_string();
    config.oauth.client_secret = "secret".to_string();
    config
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("response body is UTF-8")
    }
}

pub struct TestApp {
    pub server: MenagerieServer,
    pub app: Router,
}

impl TestApp {
    /// Alice and Bob are logged in with [`ALICE`] and [`BOB`]
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        let provider = FakeIdentityProvider::new(&[(ALICE, "alice"), (BOB, "bob")]);
        Self::with_provider(config, Arc::new(provider))
    }

    pub fn with_provider(config: ServerConfig, provider: Arc<dyn IdentityProvider>) -> Self {
        Self::build(config, Arc::new(InMemoryEntityStore::new()), provider)
    }

    /// Default users on top of a caller-supplied store
    pub fn with_store(store: Arc<dyn EntityStore>) -> Self {
        let provider = FakeIdentityProvider::new(&[(ALICE, "alice"), (BOB, "bob")]);
        Self::build(test_config(), store, Arc::new(provider))
    }

    fn build(
        config: ServerConfig,
        store: Arc<dyn EntityStore>,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        let server = MenagerieServer::new(config, store, provider).expect("server state");
        server.sessions().register(&BearerToken::new(ALICE));
        server.sessions().register(&BearerToken::new(BOB));
        let app = create_app(server.clone());
        Self { server, app }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Option<Value>) -> TestResponse {
        self.request(Method::PUT, uri, Some(token), body).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// POST /animals and return the created representation
    pub async fn create_animal(&self, token: &str, species: &str) -> Value {
        let response = self
            .post("/animals", token, serde_json::json!({ "species": species }))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
        response.json()
    }

    /// POST /zoos and return the created representation
    pub async fn create_zoo(&self, token: &str, body: Value) -> Value {
        let response = self.post("/zoos", token, body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
        response.json()
    }
}

/// The `self` link of a representation
pub fn link(value: &Value) -> String {
    value["self"].as_str().expect("self link").to_string()
}
