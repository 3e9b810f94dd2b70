//! Gitamite - read-only web viewer for a directory of git repositories.
//!
//! Requests flow through the address resolver (`git::resolve`), which pins
//! a repository, commit id and path, then through the view builder
//! (`git::ViewBuilder`), which produces a serializable `models::ViewModel`.
//! Highlighted and markdown HTML is memoized in `render::RenderCache`.

pub mod config;
pub mod error;
pub mod git;
pub mod models;
pub mod render;
pub mod routes;

pub use config::Config;
pub use error::{AppError, Result};
