//! OAuth endpoints: browser redirects plus the connect/disconnect records.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use super::{AppState, body, parse_id, query, required};
use crate::error::{ApiError, OAuthError};
use crate::oauth::{self as linking, CallbackParams, LINKABLE_PROVIDERS};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StartQuery {
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ConnectRequest {
    user_id: Option<String>,
    provider: Option<String>,
    #[serde(default)]
    profile_data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DisconnectRequest {
    user_id: Option<String>,
    provider: Option<String>,
}

/// 302 to `location`.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Validate the `userId` / `provider` pair of a connect or disconnect body.
fn target<'a>(user_id: Option<&str>, provider: Option<&'a str>) -> Result<(Uuid, &'a str), ApiError> {
    let message = "User ID and provider are required";
    let raw = required(user_id, message)?;
    let provider = required(provider, message)?;
    let user_id = parse_id(raw, "userId")?;
    if !LINKABLE_PROVIDERS.contains(&provider) {
        return Err(OAuthError::UnsupportedProvider(provider.to_string()).into());
    }
    Ok((user_id, provider))
}

/// GET /api/oauth/{provider}/start?userId=
pub(super) async fn start(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    params: Result<Query<StartQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query(params)?;
    let raw = required(params.user_id.as_deref(), "User ID parameter is required")?;
    let user_id = parse_id(raw, "userId")?;

    let url = state.oauth.initiate_auth(&provider, user_id)?;
    Ok(found(&url))
}

/// GET /api/oauth/{provider}/callback?code=&state=
///
/// Records the connection and sends the browser back to the portfolio page.
pub(super) async fn callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    params: Result<Query<CallbackParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query(params)?;
    let done = state.oauth.complete_auth(&provider, &params).await?;

    linking::record_connection(
        state.db.as_ref(),
        done.user_id,
        &provider,
        done.profile.profile_url.as_deref(),
    )
    .await?;
    Ok(found("/portfolio"))
}

/// POST /api/oauth/connect
///
/// Records a connection for a profile obtained elsewhere. `profileData.html_url`
/// becomes the stored profile URL when present.
pub(super) async fn connect(
    State(state): State<AppState>,
    payload: Result<Json<ConnectRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let req = body(payload)?;
    let (user_id, provider) = target(req.user_id.as_deref(), req.provider.as_deref())?;

    let profile_url = req
        .profile_data
        .as_ref()
        .and_then(|p| p.get("html_url"))
        .and_then(|u| u.as_str());
    let links = linking::record_connection(state.db.as_ref(), user_id, provider, profile_url)
        .await
        .inspect_err(|e| warn!(user_id = %user_id, provider, error = %e, "Connect failed"))?;

    Ok(Json(serde_json::json!({ "success": true, "socialLinks": links })).into_response())
}

/// POST /api/oauth/disconnect
pub(super) async fn disconnect(
    State(state): State<AppState>,
    payload: Result<Json<DisconnectRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let req = body(payload)?;
    let (user_id, provider) = target(req.user_id.as_deref(), req.provider.as_deref())?;

    let links = linking::disconnect(state.db.as_ref(), user_id, provider).await?;
    Ok(Json(serde_json::json!({ "success": true, "socialLinks": links })).into_response())
}
