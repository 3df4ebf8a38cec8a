//! REST layer over the store.
//!
//! Every failure renders as `{"error": "..."}` through `ApiError`.

mod clients;
mod oauth;
mod portfolio;
mod users;

use std::sync::Arc;

use axum::extract::Query;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::error::ApiError;
use crate::oauth::OAuthService;
use crate::store::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub oauth: Arc<OAuthService>,
}

impl AppState {
    pub fn new(db: Arc<dyn Database>, oauth: OAuthService) -> Self {
        Self {
            db,
            oauth: Arc::new(oauth),
        }
    }
}

/// Build the router with every REST and OAuth route.
pub fn routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/clients", post(clients::create).get(clients::fetch))
        .route("/api/users", post(users::create).get(users::fetch))
        .route("/api/portfolio", get(portfolio::fetch).post(portfolio::update))
        .route("/api/oauth/connect", post(oauth::connect))
        .route("/api/oauth/disconnect", post(oauth::disconnect))
        .route("/api/oauth/{provider}/start", get(oauth::start))
        .route("/api/oauth/{provider}/callback", get(oauth::callback))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "sewna"
    }))
}

/// Unwrap a JSON body, turning a malformed one into a 400.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| ApiError::Validation(e.body_text()))
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    params
        .map(|Query(v)| v)
        .map_err(|e| ApiError::Validation(e.body_text()))
}

/// Require a non-blank parameter.
fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Validation(message.to_string()))
}

fn parse_id(raw: &str, name: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation(format!("{name} is not a valid id")))
}
