//! Error types for sewna.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DatabaseError {
    /// Build a `Query` error, promoting SQLite constraint failures to `Constraint`.
    pub fn from_libsql(context: &str, err: libsql::Error) -> Self {
        let message = err.to_string();
        if message.contains("UNIQUE constraint failed") || message.contains("CHECK constraint failed")
        {
            DatabaseError::Constraint(format!("{context}: {message}"))
        } else {
            DatabaseError::Query(format!("{context}: {message}"))
        }
    }
}

/// Errors returned by the REST layer.
///
/// Every variant renders as `{"error": "<message>"}` with a matching status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required request parameter is missing or malformed. Rejected before any side effect.
    #[error("{0}")]
    Validation(String),

    /// Lookup by key found nothing.
    #[error("{0}")]
    NotFound(String),

    /// Datastore or identity-provider failure, surfaced as an opaque message.
    #[error("{0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{entity} {id} not found"))
            }
            other => {
                tracing::error!(error = %other, "Datastore failure");
                ApiError::Upstream(other.to_string())
            }
        }
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

/// Wizard navigation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("Wizard is already complete")]
    AlreadyComplete,

    #[error("Answer for {question_id} is not acceptable: {reason}")]
    InvalidAnswer { question_id: String, reason: String },
}

/// Errors raised while turning collected answers into a typed intake record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("{field} is required")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },
}

impl IntakeError {
    /// Id of the field at fault.
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field } | Self::InvalidField { field, .. } => field,
        }
    }
}

/// Failure to hand a completed record to the CRUD service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    /// The record failed boundary validation and was never sent.
    #[error("Invalid submission: {0}")]
    Invalid(#[from] IntakeError),

    /// The request could not be delivered.
    #[error("Could not reach the server: {0}")]
    Network(String),

    /// The server answered with a failure status.
    #[error("Server rejected the submission ({status}): {message}")]
    Server { status: u16, message: String },

    /// The server took the record but its reply carried no usable id.
    /// Never retried: the record already exists.
    #[error("Server accepted the submission ({status}) but returned no {key} id")]
    Unconfirmed { status: u16, key: String },

    /// A submission for this wizard is already pending.
    #[error("A submission is already in progress")]
    InFlight,

    /// This session's record has already been delivered.
    #[error("This form has already been submitted")]
    AlreadySubmitted,

    /// The wizard that started this submission was discarded.
    #[error("Submission was abandoned")]
    Abandoned,
}

impl SubmissionError {
    /// Human-readable message suitable for a blocking alert.
    pub fn user_message(&self) -> String {
        match self {
            Self::Invalid(e) => e.to_string(),
            Self::InFlight => "Your information is already being saved.".to_string(),
            Self::Unconfirmed { .. } | Self::AlreadySubmitted => {
                "Your information has been saved. There is no need to submit again.".to_string()
            }
            _ => "Failed to save your information. Please try again.".to_string(),
        }
    }
}

/// Which part of a profile save failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SavePart {
    Account,
    Portfolio,
    SocialLinks,
}

impl std::fmt::Display for SavePart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Account => "account",
            Self::Portfolio => "portfolio",
            Self::SocialLinks => "social links",
        };
        write!(f, "{s}")
    }
}

/// Profile save failure.
///
/// Parts are saved in order (account, portfolio, social links) and the first
/// failure stops the save; parts before it have already been persisted.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("Invalid profile data: {0}")]
    Validation(String),

    #[error("Profile for user {0} not found")]
    NotFound(String),

    #[error("Failed to save {part}: {message}")]
    Part { part: SavePart, message: String },
}

impl From<SaveError> for ApiError {
    fn from(err: SaveError) -> Self {
        match err {
            SaveError::Validation(msg) => ApiError::Validation(msg),
            SaveError::NotFound(_) => ApiError::NotFound(err.to_string()),
            SaveError::Part { .. } => ApiError::Upstream(err.to_string()),
        }
    }
}

/// OAuth flow errors.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("Provider {0} is not supported")]
    UnsupportedProvider(String),

    #[error("Provider {0} is not configured")]
    NotConfigured(String),

    #[error("OAuth state is unknown or expired")]
    InvalidState,

    #[error("Provider returned an error: {0}")]
    Denied(String),

    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

impl From<OAuthError> for ApiError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::UnsupportedProvider(_)
            | OAuthError::InvalidState
            | OAuthError::Denied(_) => ApiError::Validation(err.to_string()),
            OAuthError::NotConfigured(_) => ApiError::NotFound(err.to_string()),
            other => {
                tracing::warn!(error = %other, "Identity provider failure");
                ApiError::Upstream(other.to_string())
            }
        }
    }
}
