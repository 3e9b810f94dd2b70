//! Tree and blob views.
//!
//! - GET /repo/{repo}                                  root of the default branch
//! - GET /repo/{repo}/tree[/{path}]
//! - GET /repo/{repo}/commit/{commit}/tree[/{path}]
//! - GET /repo/{repo}/blob/{path}
//! - GET /repo/{repo}/commit/{commit}/blob/{path}
//!
//! `{commit}` is any commitish: ref name, full or abbreviated id.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use super::{AppState, build_view};
use crate::error::Result;
use crate::git::{Cancellation, ViewKind};
use crate::models::ViewModel;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/repo/{repo}", get(root_tree))
        .route("/repo/{repo}/tree", get(root_tree))
        .route("/repo/{repo}/tree/{*path}", get(tree))
        .route("/repo/{repo}/commit/{commit}/tree", get(commit_root_tree))
        .route("/repo/{repo}/commit/{commit}/tree/{*path}", get(commit_tree))
        .route("/repo/{repo}/blob/{*path}", get(blob))
        .route("/repo/{repo}/commit/{commit}/blob/{*path}", get(commit_blob))
        .with_state(state)
}

async fn root_tree(
    State(state): State<AppState>,
    Path(repo): Path<String>,
) -> Result<Json<ViewModel>> {
    tree_view(&state, repo, None, String::new()).await
}

async fn tree(
    State(state): State<AppState>,
    Path((repo, path)): Path<(String, String)>,
) -> Result<Json<ViewModel>> {
    tree_view(&state, repo, None, path).await
}

async fn commit_root_tree(
    State(state): State<AppState>,
    Path((repo, commit)): Path<(String, String)>,
) -> Result<Json<ViewModel>> {
    tree_view(&state, repo, Some(commit), String::new()).await
}

async fn commit_tree(
    State(state): State<AppState>,
    Path((repo, commit, path)): Path<(String, String, String)>,
) -> Result<Json<ViewModel>> {
    tree_view(&state, repo, Some(commit), path).await
}

async fn blob(
    State(state): State<AppState>,
    Path((repo, path)): Path<(String, String)>,
) -> Result<Json<ViewModel>> {
    blob_view(&state, repo, None, path).await
}

async fn commit_blob(
    State(state): State<AppState>,
    Path((repo, commit, path)): Path<(String, String, String)>,
) -> Result<Json<ViewModel>> {
    blob_view(&state, repo, Some(commit), path).await
}

async fn tree_view(
    state: &AppState,
    repo: String,
    commit: Option<String>,
    path: String,
) -> Result<Json<ViewModel>> {
    build_view(state, repo, commit, path, |_| Ok(ViewKind::Tree), Cancellation::new()).await
}

async fn blob_view(
    state: &AppState,
    repo: String,
    commit: Option<String>,
    path: String,
) -> Result<Json<ViewModel>> {
    build_view(state, repo, commit, path, |_| Ok(ViewKind::Blob), Cancellation::new()).await
}
