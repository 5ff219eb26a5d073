//! Middleware for request processing

pub mod auth_context;

pub use auth_context::{bearer_token, AuthContext};

use std::time::{Duration, Instant};

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Request timing middleware for performance monitoring
pub async fn request_timing_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();

    if duration > Duration::from_secs(1) {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %response.status(),
            duration_ms = duration.as_millis(),
            "Slow request detected"
        );
    } else {
        tracing::debug!(
            method = %method,
            uri = %uri,
            status = %response.status(),
            duration_ms = duration.as_millis(),
            "Request completed"
        );
    }

    response
}

/// Audit logging middleware; the bearer token only appears as a fingerprint
pub async fn audit_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let token = bearer_token(request.headers())
        .map_or_else(|| "anonymous".to_string(), |token| token.fingerprint());
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(ToString::to_string);

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status(),
        token = %token,
        user_agent = ?user_agent,
        "API request audit"
    );

    response
}

/// CORS layer for the configured browser origins; `*` allows any origin
pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}
