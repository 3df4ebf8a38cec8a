//! `/api/clients`

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::{AppState, body, query};
use crate::error::ApiError;
use crate::intake::ClientIntake;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ClientQuery {
    email: Option<String>,
    client_id: Option<String>,
}

/// POST /api/clients
pub(super) async fn create(
    State(state): State<AppState>,
    payload: Result<Json<ClientIntake>, JsonRejection>,
) -> Result<Response, ApiError> {
    let intake = body(payload)?.validated().inspect_err(|e| {
        debug!(error = %e, "Rejected client intake");
    })?;

    let client = state.db.create_client(&intake).await?;
    info!(client_id = %client.id, "Client created");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "client": client, "success": true })),
    )
        .into_response())
}

/// GET /api/clients?email= | ?clientId=
pub(super) async fn fetch(
    State(state): State<AppState>,
    params: Result<Query<ClientQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query(params)?;
    let email = params.email.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let client_id = params
        .client_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let client = match (email, client_id) {
        (Some(email), _) => state.db.get_client_by_email(email).await?,
        (None, Some(raw)) => match Uuid::parse_str(raw) {
            Ok(id) => state.db.get_client(id).await?,
            Err(_) => None,
        },
        (None, None) => {
            return Err(ApiError::Validation(
                "Email or clientId parameter is required".into(),
            ));
        }
    };

    Ok(match client {
        Some(client) => Json(serde_json::json!({ "client": client })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "client": null, "error": "Client not found" })),
        )
            .into_response(),
    })
}
