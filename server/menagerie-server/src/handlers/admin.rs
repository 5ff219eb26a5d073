use axum::{extract::State, http::StatusCode};
use tracing::warn;

use crate::error::ApiResult;
use crate::server::MenagerieServer;

/// Remove every animal and zoo of every user
///
/// Unauthenticated; only mounted while `server.enable_wipe` is set.
#[utoipa::path(
    delete,
    path = "/delete",
    tag = "admin",
    responses((status = 204, description = "Store wiped"))
)]
pub async fn wipe_store(State(server): State<MenagerieServer>) -> ApiResult<StatusCode> {
    server.store().wipe().await?;
    warn!(backend = server.store().backend(), "Entity store wiped");
    Ok(StatusCode::NO_CONTENT)
}
