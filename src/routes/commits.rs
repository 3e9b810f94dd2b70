//! Commit log endpoint.
//!
//! - GET /repo/{repo}/commits
//! - GET /repo/{repo}/{ref}/commits
//!
//! Query: `path` (only commits touching it), `limit`, `after` (cursor from
//! the previous page's `next_cursor`), `first_parent`. The first form also
//! takes `ref`, for ref names that contain a slash or collide with a fixed
//! route segment (`tree`, `blob`, `commit`, `blame`, `refs`).
//!
//! The walk runs under a deadline and is cancelled if the client goes away.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use git2::Oid;
use serde::Deserialize;

use super::{AppState, build_view};
use crate::error::{AppError, Result};
use crate::git::{Cancellation, LogQuery, ViewKind};
use crate::models::ViewModel;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/repo/{repo}/commits", get(get_commits))
        .route("/repo/{repo}/{ref}/commits", get(get_ref_commits))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CommitsQuery {
    #[serde(rename = "ref")]
    reference: Option<String>,
    #[serde(default)]
    path: String,
    limit: Option<usize>,
    after: Option<String>,
    #[serde(default)]
    first_parent: bool,
}

async fn get_commits(
    State(state): State<AppState>,
    Path(repo): Path<String>,
    Query(mut query): Query<CommitsQuery>,
) -> Result<Json<ViewModel>> {
    let reference = query.reference.take().filter(|r| !r.is_empty());
    log_view(&state, repo, reference, query).await
}

async fn get_ref_commits(
    State(state): State<AppState>,
    Path((repo, reference)): Path<(String, String)>,
    Query(query): Query<CommitsQuery>,
) -> Result<Json<ViewModel>> {
    log_view(&state, repo, Some(reference), query).await
}

async fn log_view(
    state: &AppState,
    repo: String,
    reference: Option<String>,
    query: CommitsQuery,
) -> Result<Json<ViewModel>> {
    let cancel = Cancellation::with_timeout(state.walk_timeout);
    // Dropped with this future when the client disconnects
    let _guard = cancel.guard();

    let limit = query.limit.unwrap_or(state.page_size);
    let CommitsQuery {
        path,
        after,
        first_parent,
        ..
    } = query;

    build_view(
        state,
        repo,
        reference,
        path,
        move |address| {
            let after = after
                .map(|cursor| {
                    Oid::from_str(&cursor).map_err(|_| AppError::RevisionNotFound {
                        repo: address.repo_name().to_string(),
                        revision: cursor.clone(),
                    })
                })
                .transpose()?;

            Ok(ViewKind::Log(LogQuery {
                limit,
                after,
                first_parent,
            }))
        },
        cancel.clone(),
    )
    .await
}
