//! Commit diff endpoint.
//!
//! GET /repo/{repo}/commit/{commit}?against=<commitish>&path=<path>
//!
//! Without `against` the commit is compared with its first parent (or the
//! empty tree for a root commit).

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;

use super::{AppState, build_view};
use crate::error::Result;
use crate::git::{Cancellation, ViewKind, resolve_commitish};
use crate::models::ViewModel;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/repo/{repo}/commit/{commit}", get(get_diff))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct DiffQuery {
    against: Option<String>,
    #[serde(default)]
    path: String,
}

async fn get_diff(
    State(state): State<AppState>,
    Path((repo, commit)): Path<(String, String)>,
    Query(query): Query<DiffQuery>,
) -> Result<Json<ViewModel>> {
    let against = query.against.filter(|a| !a.is_empty());

    build_view(
        &state,
        repo,
        Some(commit),
        query.path,
        move |address| {
            let against = against
                .map(|rev| resolve_commitish(&address.repository, &rev))
                .transpose()?;
            Ok(ViewKind::Diff { against })
        },
        Cancellation::new(),
    )
    .await
}
