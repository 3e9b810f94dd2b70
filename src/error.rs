//! Application error types and HTTP response mapping.
//!
//! Defines `AppError` enum for every failure the resolver, view builder and
//! registry can report, and implements Axum's `IntoResponse` to convert them
//! to JSON error bodies with an appropriate status code.
//!
//! Error mappings:
//! - `RepoNotFound`, `RevisionNotFound`, `NotFound` → 404
//! - `InvalidPath`, `InvalidName`, `AmbiguousRevision`, `NotATree`, `NotABlob` → 400
//! - `AlreadyExists` → 409
//! - `NoCommonAncestor` → 422
//! - `Cancelled` → 503
//! - `InternalStore`, `Io`, `Internal` → 500

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    #[error("Revision not found in {repo}: {revision}")]
    RevisionNotFound { repo: String, revision: String },

    #[error("Ambiguous revision in {repo}: {revision}")]
    AmbiguousRevision { repo: String, revision: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Not a directory: {path} at {commit} in {repo}")]
    NotATree {
        repo: String,
        commit: String,
        path: String,
    },

    #[error("Not a file: {path} at {commit} in {repo}")]
    NotABlob {
        repo: String,
        commit: String,
        path: String,
    },

    #[error("Path not found: {path} at {commit} in {repo}")]
    NotFound {
        repo: String,
        commit: String,
        path: String,
    },

    #[error("Cannot compare {from} with {to} in {repo}")]
    NoCommonAncestor {
        repo: String,
        from: String,
        to: String,
    },

    #[error("Repository already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid repository name: {0}")]
    InvalidName(String),

    #[error("Store error: {0}")]
    InternalStore(#[from] git2::Error),

    #[error("Request cancelled: {0}")]
    Cancelled(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable tag identifying the error kind in response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::RepoNotFound(_) => "repo_not_found",
            AppError::RevisionNotFound { .. } => "revision_not_found",
            AppError::AmbiguousRevision { .. } => "ambiguous_revision",
            AppError::InvalidPath(_) => "invalid_path",
            AppError::NotATree { .. } => "not_a_tree",
            AppError::NotABlob { .. } => "not_a_blob",
            AppError::NotFound { .. } => "not_found",
            AppError::NoCommonAncestor { .. } => "no_common_ancestor",
            AppError::AlreadyExists(_) => "already_exists",
            AppError::InvalidName(_) => "invalid_name",
            AppError::InternalStore(_) => "internal_store_error",
            AppError::Cancelled(_) => "cancelled",
            AppError::Io(_) => "io_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::RepoNotFound(_)
            | AppError::RevisionNotFound { .. }
            | AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::InvalidPath(_)
            | AppError::InvalidName(_)
            | AppError::AmbiguousRevision { .. }
            | AppError::NotATree { .. }
            | AppError::NotABlob { .. } => StatusCode::BAD_REQUEST,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::NoCommonAncestor { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Cancelled(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalStore(_) | AppError::Io(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub(crate) fn lock_poisoned() -> Self {
        AppError::Internal("Lock poisoned".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Corruption must stand out from ordinary misses in the logs
        if let AppError::InternalStore(e) = &self {
            tracing::error!("Object store failure: {}", e);
        }

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
