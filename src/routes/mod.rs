//! HTTP route handlers - maps the addressing scheme onto resolver + views.
//!
//! Each submodule defines routes for a feature area:
//! - `repository`: Repository index, create/delete, ref listing
//! - `tree`: Tree and blob views, optionally pinned to a commit or ref
//! - `commits`: Paginated log view
//! - `diff`: Commit diff against its first parent or another revision
//! - `blame`: Per-line attribution
//!
//! All git work runs on the blocking pool; handlers only shuttle requests in
//! and view-models out.

pub mod blame;
pub mod commits;
pub mod diff;
pub mod repository;
pub mod tree;

use axum::{Json, Router};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::git::{Cancellation, Registry, ResolvedAddress, ViewBuilder, ViewKind, resolve};
use crate::models::ViewModel;
use crate::render::{HtmlRenderer, RenderCache};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub views: Arc<ViewBuilder>,
    /// Log page size when the request doesn't give one
    pub page_size: usize,
    pub walk_timeout: Duration,
}

impl AppState {
    pub fn new(registry: Arc<Registry>, views: Arc<ViewBuilder>) -> Self {
        Self {
            registry,
            views,
            page_size: 50,
            walk_timeout: Duration::from_secs(10),
        }
    }

    pub fn from_config(config: &Config, registry: Registry) -> Self {
        let views = ViewBuilder::new(
            Arc::new(RenderCache::new(config.cache_capacity)),
            Arc::new(HtmlRenderer::new()),
            config.view_settings(),
        );

        Self {
            registry: Arc::new(registry),
            views: Arc::new(views),
            page_size: config.page_size,
            walk_timeout: config.walk_timeout(),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(repository::routes(state.clone()))
        .merge(tree::routes(state.clone()))
        .merge(commits::routes(state.clone()))
        .merge(diff::routes(state.clone()))
        .merge(blame::routes(state))
}

/// Run synchronous git work off the async executor.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("Worker failed: {}", e)))?
}

/// Resolve the address, pick the view kind (which may resolve further
/// revisions in the same repository), and build the view.
pub(crate) async fn build_view<K>(
    state: &AppState,
    repo: String,
    commitish: Option<String>,
    path: String,
    kind: K,
    cancel: Cancellation,
) -> Result<Json<ViewModel>>
where
    K: FnOnce(&ResolvedAddress) -> Result<ViewKind> + Send + 'static,
{
    let registry = Arc::clone(&state.registry);
    let views = Arc::clone(&state.views);

    let model = blocking(move || {
        let address = resolve(&registry, &repo, commitish.as_deref(), &path)?;
        let kind = kind(&address)?;
        views.build(&address, kind, &cancel)
    })
    .await?;

    Ok(Json(model))
}
