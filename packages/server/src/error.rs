use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `PERMISSION_DENIED`, `NOT_FOUND`, `CONFLICT`,
    /// `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Failed to publish model: Model name is required")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    PermissionDenied,
    NotFound(String),
    Conflict(String),
    /// Server-side failure whose message is safe to show.
    Failed(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid or expired token".into(),
                },
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "PERMISSION_DENIED",
                    message: "Insufficient permissions".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::Failed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    code: "INTERNAL_ERROR",
                    message: msg,
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(path) => AppError::NotFound(format!("Asset '{path}' not found")),
            StorageError::InvalidPath(path) => {
                AppError::Validation(format!("Invalid asset path '{path}'"))
            }
            StorageError::UnsupportedType(msg) => AppError::Validation(msg),
            StorageError::SizeLimitExceeded { actual, limit } => AppError::Validation(format!(
                "File too large ({actual} bytes, limit {limit} bytes)"
            )),
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// Errors raised by the catalog core (repository and ingestion).
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Missing or malformed input, detected before the offending write.
    #[error("{0}")]
    Validation(String),

    /// A referenced lookup row (or the model itself) does not exist.
    #[error("{entity} '{name}' not found")]
    NotFound { entity: &'static str, name: String },

    #[error("Model '{name}' already exists for this brand")]
    DuplicateModel { name: String, brand_id: i32 },

    #[error("database error during {operation} (model {model_id:?})")]
    Storage {
        operation: &'static str,
        model_id: Option<i32>,
        #[source]
        source: DbErr,
    },

    #[error("asset storage error: {0}")]
    Filesystem(#[from] StorageError),
}

impl CatalogError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn model_not_found(id: i32) -> Self {
        Self::NotFound {
            entity: "Model",
            name: id.to_string(),
        }
    }
}

/// Failures outside the publish/update/delete flows (reads, author mirroring).
impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(msg) => AppError::Validation(msg),
            e @ CatalogError::NotFound { .. } => AppError::NotFound(e.to_string()),
            e @ CatalogError::DuplicateModel { .. } => AppError::Conflict(e.to_string()),
            CatalogError::Storage {
                operation,
                model_id,
                source,
            } => AppError::Internal(format!("{operation} (model {model_id:?}): {source}")),
            CatalogError::Filesystem(e) => e.into(),
        }
    }
}

/// Attaches the operation name and model id to a database error.
pub trait DbContext<T> {
    fn context(self, operation: &'static str, model_id: Option<i32>) -> Result<T, CatalogError>;
}

impl<T> DbContext<T> for Result<T, DbErr> {
    fn context(self, operation: &'static str, model_id: Option<i32>) -> Result<T, CatalogError> {
        self.map_err(|source| CatalogError::Storage {
            operation,
            model_id,
            source,
        })
    }
}

/// Top-level ingestion operation, named in user-facing failure messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Publish,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Publish => "publish",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// A failed publish/update/delete, carrying the cause for logging.
#[derive(Debug, thiserror::Error)]
#[error("Failed to {operation} model")]
pub struct IngestFailure {
    pub operation: Operation,
    #[source]
    pub source: CatalogError,
}

impl IngestFailure {
    pub fn new(operation: Operation, source: CatalogError) -> Self {
        Self { operation, source }
    }

    /// Message shown to the caller. Only input-related reasons are appended;
    /// database and filesystem details stay in the logs.
    pub fn user_message(&self) -> String {
        match &self.source {
            CatalogError::Validation(_)
            | CatalogError::NotFound { .. }
            | CatalogError::DuplicateModel { .. } => format!("{self}: {}", self.source),
            CatalogError::Storage { .. } | CatalogError::Filesystem(_) => self.to_string(),
        }
    }
}

impl From<IngestFailure> for AppError {
    fn from(failure: IngestFailure) -> Self {
        let message = failure.user_message();
        match failure.source {
            CatalogError::Validation(_) => AppError::Validation(message),
            CatalogError::NotFound { .. } => AppError::NotFound(message),
            CatalogError::DuplicateModel { .. } => AppError::Conflict(message),
            CatalogError::Storage { .. } | CatalogError::Filesystem(_) => {
                tracing::error!(
                    operation = %failure.operation,
                    error = ?failure.source,
                    "Ingestion failed"
                );
                AppError::Failed(message)
            }
        }
    }
}
