//! Repository index and lifecycle.
//!
//! - GET /                      repositories, sorted by name
//! - POST /repo { name }        create an empty bare repository
//! - DELETE /repo { name }      delete a repository and its directory
//! - GET /repo/{repo}/refs      branches and tags

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{AppState, blocking};
use crate::error::{AppError, Result};
use crate::models::{RefInfo, RepositoryInfo};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_repositories))
        .route("/repo", post(create_repository).delete(delete_repository))
        .route("/repo/{repo}/refs", get(list_refs))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct RepoNameRequest {
    name: String,
}

async fn list_repositories(State(state): State<AppState>) -> Result<Json<Vec<RepositoryInfo>>> {
    let registry = Arc::clone(&state.registry);
    let repos = blocking(move || registry.list()).await?;
    Ok(Json(repos))
}

async fn create_repository(
    State(state): State<AppState>,
    Json(request): Json<RepoNameRequest>,
) -> Result<(StatusCode, Json<RepositoryInfo>)> {
    let registry = Arc::clone(&state.registry);
    let info = blocking(move || registry.create(&request.name)?.info()).await?;
    Ok((StatusCode::CREATED, Json(info)))
}

async fn delete_repository(
    State(state): State<AppState>,
    Json(request): Json<RepoNameRequest>,
) -> Result<StatusCode> {
    let registry = Arc::clone(&state.registry);
    blocking(move || registry.delete(&request.name)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_refs(
    State(state): State<AppState>,
    Path(repo): Path<String>,
) -> Result<Json<Vec<RefInfo>>> {
    let repository = state
        .registry
        .get(&repo)?
        .ok_or_else(|| AppError::RepoNotFound(repo.clone()))?;
    let refs = blocking(move || repository.list_refs()).await?;
    Ok(Json(refs))
}
