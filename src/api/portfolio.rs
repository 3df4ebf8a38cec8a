//! `/api/portfolio`: composite profile fetch and update.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use super::{AppState, body, parse_id, query, required};
use crate::error::ApiError;
use crate::profile::{ProfileForm, load_profile, save_profile};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PortfolioQuery {
    user_id: Option<String>,
}

/// Body of POST /api/portfolio: the flat form plus the user id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PortfolioUpdate {
    user_id: Option<String>,
    #[serde(flatten)]
    form: ProfileForm,
}

/// GET /api/portfolio?userId=
pub(super) async fn fetch(
    State(state): State<AppState>,
    params: Result<Query<PortfolioQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query(params)?;
    let raw = required(params.user_id.as_deref(), "User ID parameter is required")?;
    let user_id = parse_id(raw, "userId")?;

    let record = load_profile(state.db.as_ref(), user_id).await?;
    Ok(Json(serde_json::json!({
        "user": record.user,
        "portfolio": record.portfolio,
        "socialLinks": record.social_links,
    }))
    .into_response())
}

/// POST /api/portfolio
///
/// Saves account (when a name is present), portfolio and social links in that
/// order. The first failing part is named in the error.
pub(super) async fn update(
    State(state): State<AppState>,
    payload: Result<Json<PortfolioUpdate>, JsonRejection>,
) -> Result<Response, ApiError> {
    let req = body(payload)?;
    let raw = required(req.user_id.as_deref(), "User ID is required")?;
    let user_id = parse_id(raw, "userId")?;

    let update = req.form.to_update()?;
    let record = save_profile(state.db.as_ref(), user_id, &update).await?;
    Ok(Json(serde_json::json!({
        "user": record.user,
        "portfolio": record.portfolio,
        "socialLinks": record.social_links,
        "success": true,
    }))
    .into_response())
}
