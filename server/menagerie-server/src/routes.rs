pub mod paths;

use axum::{
    routing::{delete, get},
    Router,
};

use crate::{
    handlers::{admin, animals, auth, health, zoos},
    openapi,
    server::MenagerieServer,
};

/// Create health check routes
pub fn health_routes() -> Router<MenagerieServer> {
    Router::new().route(paths::health::HEALTH, get(health::health_check))
}

/// Create login, redirect and logout routes
pub fn auth_routes() -> Router<MenagerieServer> {
    Router::new()
        .route(paths::auth::WELCOME, get(auth::welcome))
        .route(paths::auth::LOGIN, get(auth::login))
        .route(paths::auth::OAUTH_CALLBACK, get(auth::oauth_callback))
        .route(paths::auth::LOGOUT, get(auth::logout))
}

/// Create animal routes
pub fn animal_routes() -> Router<MenagerieServer> {
    Router::new()
        .route(
            paths::animals::COLLECTION,
            get(animals::list_animals).post(animals::create_animal),
        )
        .route(
            paths::animals::BY_ID,
            get(animals::get_animal)
                .put(animals::replace_animal)
                .patch(animals::patch_animal)
                .delete(animals::delete_animal),
        )
}

/// Create zoo routes, including species-list links
pub fn zoo_routes() -> Router<MenagerieServer> {
    Router::new()
        .route(
            paths::zoos::COLLECTION,
            get(zoos::list_zoos).post(zoos::create_zoo),
        )
        .route(
            paths::zoos::BY_ID,
            get(zoos::get_zoo)
                .put(zoos::replace_zoo)
                .patch(zoos::patch_zoo)
                .delete(zoos::delete_zoo),
        )
        .route(paths::zoos::ANIMALS, get(zoos::list_zoo_animals))
        .route(
            paths::zoos::ANIMAL_BY_ID,
            get(zoos::get_zoo_animal)
                .put(zoos::link_animal)
                .delete(zoos::unlink_animal),
        )
}

/// Create the unauthenticated maintenance routes
pub fn admin_routes() -> Router<MenagerieServer> {
    Router::new().route(paths::admin::WIPE, delete(admin::wipe_store))
}

/// Create all routes; `enable_wipe` mounts `DELETE /delete`
pub fn create_routes(enable_wipe: bool) -> Router<MenagerieServer> {
    let router = Router::new()
        .merge(health_routes())
        .merge(auth_routes())
        .merge(animal_routes())
        .merge(zoo_routes())
        .merge(openapi::create_docs_routes());

    if enable_wipe {
        router.merge(admin_routes())
    } else {
        router
    }
}
