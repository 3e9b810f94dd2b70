//! Blame endpoint.
//!
//! GET /repo/{repo}/blame/blob/{path}?commit=<optional commitish>
//!
//! Returns per-line attribution for a file at a commit (default branch when
//! `commit` is absent).

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;

use super::{AppState, build_view};
use crate::error::Result;
use crate::git::{Cancellation, ViewKind};
use crate::models::ViewModel;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/repo/{repo}/blame/blob/{*path}", get(get_blame))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct BlameQuery {
    commit: Option<String>,
}

async fn get_blame(
    State(state): State<AppState>,
    Path((repo, path)): Path<(String, String)>,
    Query(query): Query<BlameQuery>,
) -> Result<Json<ViewModel>> {
    build_view(
        &state,
        repo,
        query.commit,
        path,
        |_| Ok(ViewKind::Blame),
        Cancellation::new(),
    )
    .await
}
