//! Repository view resolution.
//!
//! - `registry`: name → opened repository handle
//! - `resolver`: navigational request → pinned `ResolvedAddress`
//! - `view`: `ResolvedAddress` + `ViewKind` → `ViewModel`
//! - `repository`, `refs`, `tree`, `history`, `diff`, `blame`: the git2-backed
//!   object access each view is built from

pub mod blame;
pub mod cancel;
pub mod diff;
pub mod history;
pub mod refs;
pub mod registry;
pub mod repository;
pub mod resolver;
pub mod tree;
pub mod view;

pub use cancel::Cancellation;
pub use history::LogQuery;
pub use registry::{Registry, SharedRepo};
pub use repository::GitRepository;
pub use resolver::{ResolvedAddress, resolve, resolve_commitish};
pub use view::{ViewBuilder, ViewKind, ViewSettings};
