use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use entity_store::AnimalId;

use crate::error::ApiResult;
use crate::middleware::AuthContext;
use crate::server::MenagerieServer;
use crate::services::parse_id;
use crate::types::{AnimalListParams, AnimalPayload, AnimalView};
use crate::validation::ApiJson;

/// Create an animal owned by the caller
#[utoipa::path(
    post,
    path = "/animals",
    tag = "animals",
    request_body = AnimalPayload,
    responses(
        (status = 201, description = "Animal created", body = AnimalView),
        (status = 400, description = "Missing species or checked_in=false"),
        (status = 401, description = "No active session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_animal(
    State(server): State<MenagerieServer>,
    auth: AuthContext,
    ApiJson(payload): ApiJson<AnimalPayload>,
) -> ApiResult<(StatusCode, Json<AnimalView>)> {
    let animal = server.animals().create(&auth.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(animal.into())))
}

/// List the caller's animals
#[utoipa::path(
    get,
    path = "/animals",
    tag = "animals",
    params(AnimalListParams),
    responses(
        (status = 200, description = "The caller's animals", body = [AnimalView]),
        (status = 400, description = "checkedIn is neither true nor false"),
        (status = 401, description = "No active session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_animals(
    State(server): State<MenagerieServer>,
    auth: AuthContext,
    Query(params): Query<AnimalListParams>,
) -> ApiResult<Json<Vec<AnimalView>>> {
    let checked_in = params.checked_in_filter()?;
    let animals = server.animals().list(&auth.user_id, checked_in).await?;
    Ok(Json(animals.into_iter().map(AnimalView::from).collect()))
}

#[utoipa::path(
    get,
    path = "/animals/{animal_id}",
    tag = "animals",
    params(("animal_id" = String, Path, description = "Animal id")),
    responses(
        (status = 200, description = "The animal", body = AnimalView),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such animal")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_animal(
    State(server): State<MenagerieServer>,
    auth: AuthContext,
    Path(animal_id): Path<String>,
) -> ApiResult<Json<AnimalView>> {
    let id: AnimalId = parse_id("animal", &animal_id)?;
    let animal = server.animals().get(&auth.user_id, id).await?;
    Ok(Json(animal.into()))
}

/// Replace an animal; optional fields missing from the body are cleared
#[utoipa::path(
    put,
    path = "/animals/{animal_id}",
    tag = "animals",
    params(("animal_id" = String, Path, description = "Animal id")),
    request_body = AnimalPayload,
    responses(
        (status = 200, description = "Animal replaced", body = AnimalView),
        (status = 400, description = "Missing species or contradicting checked_in"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such animal"),
        (status = 409, description = "Concurrent modification")
    ),
    security(("bearer_auth" = []))
)]
pub async fn replace_animal(
    State(server): State<MenagerieServer>,
    auth: AuthContext,
    Path(animal_id): Path<String>,
    ApiJson(payload): ApiJson<AnimalPayload>,
) -> ApiResult<Json<AnimalView>> {
    let id: AnimalId = parse_id("animal", &animal_id)?;
    let animal = server.animals().replace(&auth.user_id, id, payload).await?;
    Ok(Json(animal.into()))
}

/// Update only the fields present in the body
#[utoipa::path(
    patch,
    path = "/animals/{animal_id}",
    tag = "animals",
    params(("animal_id" = String, Path, description = "Animal id")),
    request_body = AnimalPayload,
    responses(
        (status = 200, description = "Animal updated", body = AnimalView),
        (status = 400, description = "Blank species or contradicting checked_in"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such animal"),
        (status = 409, description = "Concurrent modification")
    ),
    security(("bearer_auth" = []))
)]
pub async fn patch_animal(
    State(server): State<MenagerieServer>,
    auth: AuthContext,
    Path(animal_id): Path<String>,
    ApiJson(payload): ApiJson<AnimalPayload>,
) -> ApiResult<Json<AnimalView>> {
    let id: AnimalId = parse_id("animal", &animal_id)?;
    let animal = server.animals().patch(&auth.user_id, id, payload).await?;
    Ok(Json(animal.into()))
}

/// Delete an animal, removing it from the zoo holding it
#[utoipa::path(
    delete,
    path = "/animals/{animal_id}",
    tag = "animals",
    params(("animal_id" = String, Path, description = "Animal id")),
    responses(
        (status = 204, description = "Animal deleted"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such animal"),
        (status = 409, description = "Concurrent modification")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_animal(
    State(server): State<MenagerieServer>,
    auth: AuthContext,
    Path(animal_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id: AnimalId = parse_id("animal", &animal_id)?;
    server.animals().delete(&auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
