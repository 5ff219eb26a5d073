//! Menagerie server - per-user zoos and the animals checked out to them
//!
//! This library holds the HTTP application: configuration, the caller
//! extractor, the animal and zoo services, handlers, routes and the OpenAPI
//! document. The binary in `main.rs` only loads configuration and serves
//! [`create_app`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use server::MenagerieServer;

use std::time::Duration;

use axum::{middleware::from_fn, Router};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Create the main application router with all routes and middleware
pub fn create_app(server: MenagerieServer) -> Router {
    let listen = &server.config.server;
    let timeout = Duration::from_secs(listen.request_timeout_secs);
    let cors = middleware::create_cors_layer(&listen.cors_origins);

    routes::create_routes(listen.enable_wipe)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(TimeoutLayer::new(timeout))
                .layer(from_fn(middleware::request_timing_middleware))
                .layer(from_fn(middleware::audit_logging_middleware)),
        )
        .with_state(server)
}
