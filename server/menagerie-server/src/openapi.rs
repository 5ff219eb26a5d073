use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{admin, animals, auth, health, zoos};
use crate::routes::paths;
use crate::server::MenagerieServer;
use crate::types::{AnimalPayload, AnimalView, LinkFailure, LinkFailureReason, ZooPayload, ZooView};

/// Main API documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Menagerie API",
        description = "Per-user zoos and the animals checked out to them. \
                       Log in at /login/ and send the returned token as a Bearer header.",
        license(name = "AGPL-3.0-only")
    ),
    paths(
        health::health_check,
        auth::welcome,
        auth::login,
        auth::oauth_callback,
        auth::logout,
        animals::create_animal,
        animals::list_animals,
        animals::get_animal,
        animals::replace_animal,
        animals::patch_animal,
        animals::delete_animal,
        zoos::create_zoo,
        zoos::list_zoos,
        zoos::get_zoo,
        zoos::replace_zoo,
        zoos::patch_zoo,
        zoos::delete_zoo,
        zoos::list_zoo_animals,
        zoos::get_zoo_animal,
        zoos::link_animal,
        zoos::unlink_animal,
        admin::wipe_store,
    ),
    components(schemas(
        health::HealthResponse,
        auth::TokenResponse,
        AnimalPayload,
        AnimalView,
        ZooPayload,
        ZooView,
        LinkFailure,
        LinkFailureReason,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "animals", description = "Animal resources"),
        (name = "zoos", description = "Zoo resources and species-list links"),
        (name = "auth", description = "OAuth login and sessions"),
        (name = "health", description = "Liveness"),
        (name = "admin", description = "Maintenance")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// Create OpenAPI documentation routes
pub fn create_docs_routes() -> Router<MenagerieServer> {
    Router::new()
        .merge(SwaggerUi::new(paths::docs::SWAGGER_UI).url(paths::docs::OPENAPI_JSON, ApiDoc::openapi()))
}
