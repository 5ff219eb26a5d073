//! Browser-facing login endpoints
//!
//! `/login/` starts the provider's authorization-code flow and relays the
//! provider page, `/oauth` is the redirect target that exchanges the code for
//! an access token and opens a session, `/logout` closes it again.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiResult;
use crate::middleware::bearer_token;
use crate::server::MenagerieServer;

const WELCOME_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Menagerie</title></head>
  <body>
    <h1>Menagerie</h1>
    <p>Keep track of your zoos and the animals checked out to them.</p>
    <form action="/login/" method="get">
      <button type="submit">Log in</button>
    </form>
  </body>
</html>
"#;

/// Query parameters of the provider redirect
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OAuthCallbackParams {
    pub state: Option<String>,
    pub code: Option<String>,
    /// Set by the provider when the user declined
    pub error: Option<String>,
}

/// Access token issued by the `/oauth` exchange
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    #[schema(example = "Bearer")]
    pub token_type: String,
    pub access_token: String,
    /// Ready-made `Authorization` header value
    #[schema(example = "Bearer ya29.a0AfH6SM...")]
    pub authorization: String,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "auth",
    responses((status = 200, description = "Welcome page", content_type = "text/html"))
)]
pub async fn welcome() -> Html<&'static str> {
    Html(WELCOME_PAGE)
}

/// Start the authorization-code flow
#[utoipa::path(
    get,
    path = "/login/",
    tag = "auth",
    responses(
        (status = 200, description = "Provider authorization page", content_type = "text/html"),
        (status = 502, description = "Provider unreachable")
    )
)]
pub async fn login(State(server): State<MenagerieServer>) -> ApiResult<Response> {
    let attempt = server.login().begin().await?;
    let status = StatusCode::from_u16(attempt.page.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = attempt
        .page
        .content_type
        .unwrap_or_else(|| "text/html; charset=utf-8".to_string());

    Ok((status, [(header::CONTENT_TYPE, content_type)], attempt.page.body).into_response())
}

/// Complete the flow: check the state, exchange the code, open a session
#[utoipa::path(
    get,
    path = "/oauth",
    tag = "auth",
    params(OAuthCallbackParams),
    responses(
        (status = 200, description = "Session opened", body = TokenResponse),
        (status = 400, description = "Missing authorization code"),
        (status = 401, description = "Unknown, expired or reused state, or access denied"),
        (status = 502, description = "Token exchange failed")
    )
)]
pub async fn oauth_callback(
    State(server): State<MenagerieServer>,
    Query(params): Query<OAuthCallbackParams>,
) -> ApiResult<Json<TokenResponse>> {
    let token = server
        .login()
        .complete(
            params.state.as_deref(),
            params.code.as_deref(),
            params.error.as_deref(),
        )
        .await?;

    Ok(Json(TokenResponse {
        token_type: "Bearer".to_string(),
        access_token: token.expose().to_string(),
        authorization: token.authorization_value(),
    }))
}

/// Revoke the presented bearer token
#[utoipa::path(
    get,
    path = "/logout",
    tag = "auth",
    responses((status = 200, description = "Logged out", content_type = "text/plain")),
    security((), ("bearer_auth" = []))
)]
pub async fn logout(State(server): State<MenagerieServer>, headers: HeaderMap) -> &'static str {
    let token = bearer_token(&headers);
    server.login().logout(token.as_ref());
    "You have been logged out."
}
