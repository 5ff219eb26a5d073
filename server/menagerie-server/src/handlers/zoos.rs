use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use entity_store::{AnimalId, ZooId};

use crate::error::ApiResult;
use crate::middleware::AuthContext;
use crate::server::MenagerieServer;
use crate::services::{parse_id, ZooOutcome};
use crate::types::{AnimalView, ZooPayload, ZooView};
use crate::validation::ApiJson;

fn render(outcome: ZooOutcome) -> ZooView {
    ZooView::from(outcome.zoo).with_link_errors(outcome.link_errors)
}

/// Create a zoo; `species_list` items are linked where they resolve
#[utoipa::path(
    post,
    path = "/zoos",
    tag = "zoos",
    request_body = ZooPayload,
    responses(
        (status = 201, description = "Zoo created; unresolved items in link_errors", body = ZooView),
        (status = 400, description = "Missing name"),
        (status = 401, description = "No active session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_zoo(
    State(server): State<MenagerieServer>,
    auth: AuthContext,
    ApiJson(payload): ApiJson<ZooPayload>,
) -> ApiResult<(StatusCode, Json<ZooView>)> {
    let outcome = server.zoos().create(&auth.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(render(outcome))))
}

/// List the caller's zoos
#[utoipa::path(
    get,
    path = "/zoos",
    tag = "zoos",
    responses(
        (status = 200, description = "The caller's zoos", body = [ZooView]),
        (status = 401, description = "No active session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_zoos(
    State(server): State<MenagerieServer>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<ZooView>>> {
    let zoos = server.zoos().list(&auth.user_id).await?;
    Ok(Json(zoos.into_iter().map(ZooView::from).collect()))
}

#[utoipa::path(
    get,
    path = "/zoos/{zoo_id}",
    tag = "zoos",
    params(("zoo_id" = String, Path, description = "Zoo id")),
    responses(
        (status = 200, description = "The zoo", body = ZooView),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such zoo")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_zoo(
    State(server): State<MenagerieServer>,
    auth: AuthContext,
    Path(zoo_id): Path<String>,
) -> ApiResult<Json<ZooView>> {
    let id: ZooId = parse_id("zoo", &zoo_id)?;
    let zoo = server.zoos().get(&auth.user_id, id).await?;
    Ok(Json(zoo.into()))
}

/// Replace a zoo; a missing `species_list` checks every animal back in
#[utoipa::path(
    put,
    path = "/zoos/{zoo_id}",
    tag = "zoos",
    params(("zoo_id" = String, Path, description = "Zoo id")),
    request_body = ZooPayload,
    responses(
        (status = 200, description = "Zoo replaced", body = ZooView),
        (status = 400, description = "Missing name"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such zoo"),
        (status = 409, description = "Concurrent modification")
    ),
    security(("bearer_auth" = []))
)]
pub async fn replace_zoo(
    State(server): State<MenagerieServer>,
    auth: AuthContext,
    Path(zoo_id): Path<String>,
    ApiJson(payload): ApiJson<ZooPayload>,
) -> ApiResult<Json<ZooView>> {
    let id: ZooId = parse_id("zoo", &zoo_id)?;
    let outcome = server.zoos().replace(&auth.user_id, id, payload).await?;
    Ok(Json(render(outcome)))
}

/// Update only the fields present in the body
#[utoipa::path(
    patch,
    path = "/zoos/{zoo_id}",
    tag = "zoos",
    params(("zoo_id" = String, Path, description = "Zoo id")),
    request_body = ZooPayload,
    responses(
        (status = 200, description = "Zoo updated", body = ZooView),
        (status = 400, description = "Blank name"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such zoo"),
        (status = 409, description = "Concurrent modification")
    ),
    security(("bearer_auth" = []))
)]
pub async fn patch_zoo(
    State(server): State<MenagerieServer>,
    auth: AuthContext,
    Path(zoo_id): Path<String>,
    ApiJson(payload): ApiJson<ZooPayload>,
) -> ApiResult<Json<ZooView>> {
    let id: ZooId = parse_id("zoo", &zoo_id)?;
    let outcome = server.zoos().patch(&auth.user_id, id, payload).await?;
    Ok(Json(render(outcome)))
}

/// Delete a zoo; its animals are checked back in, not deleted
#[utoipa::path(
    delete,
    path = "/zoos/{zoo_id}",
    tag = "zoos",
    params(("zoo_id" = String, Path, description = "Zoo id")),
    responses(
        (status = 204, description = "Zoo deleted"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such zoo"),
        (status = 409, description = "Concurrent modification")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_zoo(
    State(server): State<MenagerieServer>,
    auth: AuthContext,
    Path(zoo_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id: ZooId = parse_id("zoo", &zoo_id)?;
    server.zoos().delete(&auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Animals checked out to the zoo, in species-list order
#[utoipa::path(
    get,
    path = "/zoos/{zoo_id}/animals",
    tag = "zoos",
    params(("zoo_id" = String, Path, description = "Zoo id")),
    responses(
        (status = 200, description = "The zoo's animals", body = [AnimalView]),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such zoo")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_zoo_animals(
    State(server): State<MenagerieServer>,
    auth: AuthContext,
    Path(zoo_id): Path<String>,
) -> ApiResult<Json<Vec<AnimalView>>> {
    let id: ZooId = parse_id("zoo", &zoo_id)?;
    let animals = server.zoos().animals(&auth.user_id, id).await?;
    Ok(Json(animals.into_iter().map(AnimalView::from).collect()))
}

#[utoipa::path(
    get,
    path = "/zoos/{zoo_id}/animals/{animal_id}",
    tag = "zoos",
    params(
        ("zoo_id" = String, Path, description = "Zoo id"),
        ("animal_id" = String, Path, description = "Animal id")
    ),
    responses(
        (status = 200, description = "The animal", body = AnimalView),
        (status = 403, description = "Zoo or animal owned by another user"),
        (status = 404, description = "No such zoo, animal, or listing")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_zoo_animal(
    State(server): State<MenagerieServer>,
    auth: AuthContext,
    Path((zoo_id, animal_id)): Path<(String, String)>,
) -> ApiResult<Json<AnimalView>> {
    let zoo: ZooId = parse_id("zoo", &zoo_id)?;
    let animal: AnimalId = parse_id("animal", &animal_id)?;
    let animal = server.zoos().animal(&auth.user_id, zoo, animal).await?;
    Ok(Json(animal.into()))
}

/// Check an animal out to the zoo
#[utoipa::path(
    put,
    path = "/zoos/{zoo_id}/animals/{animal_id}",
    tag = "zoos",
    params(
        ("zoo_id" = String, Path, description = "Zoo id"),
        ("animal_id" = String, Path, description = "Animal id")
    ),
    responses(
        (status = 201, description = "Animal linked", body = ZooView),
        (status = 403, description = "Zoo or animal owned by another user"),
        (status = 404, description = "No such zoo or animal"),
        (status = 409, description = "Animal held by another zoo")
    ),
    security(("bearer_auth" = []))
)]
pub async fn link_animal(
    State(server): State<MenagerieServer>,
    auth: AuthContext,
    Path((zoo_id, animal_id)): Path<(String, String)>,
) -> ApiResult<(StatusCode, Json<ZooView>)> {
    let zoo: ZooId = parse_id("zoo", &zoo_id)?;
    let animal: AnimalId = parse_id("animal", &animal_id)?;
    let zoo = server.zoos().link(&auth.user_id, zoo, animal).await?;
    Ok((StatusCode::CREATED, Json(zoo.into())))
}

/// Check an animal back in from the zoo
#[utoipa::path(
    delete,
    path = "/zoos/{zoo_id}/animals/{animal_id}",
    tag = "zoos",
    params(
        ("zoo_id" = String, Path, description = "Zoo id"),
        ("animal_id" = String, Path, description = "Animal id")
    ),
    responses(
        (status = 200, description = "Animal unlinked", body = ZooView),
        (status = 403, description = "Zoo or animal owned by another user"),
        (status = 404, description = "Not listed by this zoo")
    ),
    security(("bearer_auth" = []))
)]
pub async fn unlink_animal(
    State(server): State<MenagerieServer>,
    auth: AuthContext,
    Path((zoo_id, animal_id)): Path<(String, String)>,
) -> ApiResult<Json<ZooView>> {
    let zoo: ZooId = parse_id("zoo", &zoo_id)?;
    let animal: AnimalId = parse_id("animal", &animal_id)?;
    let zoo = server.zoos().unlink(&auth.user_id, zoo, animal).await?;
    Ok(Json(zoo.into()))
}
