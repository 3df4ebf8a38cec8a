//! `/api/users`: designer accounts.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{debug, info};

use super::{AppState, body, query, required};
use crate::error::ApiError;
use crate::intake::DesignerIntake;

#[derive(Debug, Deserialize)]
pub(super) struct UserQuery {
    email: Option<String>,
}

/// POST /api/users
///
/// Creates the user together with its empty portfolio and social links.
pub(super) async fn create(
    State(state): State<AppState>,
    payload: Result<Json<DesignerIntake>, JsonRejection>,
) -> Result<Response, ApiError> {
    let intake = body(payload)?.validated().inspect_err(|e| {
        debug!(error = %e, "Rejected designer intake");
    })?;

    let provisioned = state.db.create_designer(&intake).await?;
    info!(user_id = %provisioned.user.id, "Designer created");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "user": provisioned.user, "success": true })),
    )
        .into_response())
}

/// GET /api/users?email=
pub(super) async fn fetch(
    State(state): State<AppState>,
    params: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query(params)?;
    let email = required(params.email.as_deref(), "Email parameter is required")?;

    Ok(match state.db.get_user_by_email(email).await? {
        Some(user) => Json(serde_json::json!({ "user": user })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "user": null, "error": "User not found" })),
        )
            .into_response(),
    })
}
