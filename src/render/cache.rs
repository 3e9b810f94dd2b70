//! Render cache for highlighted and markdown HTML.
//!
//! Entries are keyed by `(object id, render kind)`. Renders are pure functions
//! of blob content, so an entry never goes stale and needs no invalidation;
//! the LRU bound exists only to cap memory.
//!
//! Concurrent misses on one key are coalesced: the first caller marks the key
//! pending and renders outside the lock, later callers wait on the condvar
//! until the pending marker is cleared. If the leader fails (or panics) the
//! marker is still cleared and one of the waiters takes over.

use git2::Oid;
use lru::LruCache;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::error::{AppError, Result};

pub type Rendered = Arc<str>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RenderKind {
    /// Syntax highlighting with a language hint
    Highlight(String),
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub object_id: Oid,
    pub kind: RenderKind,
}

impl CacheKey {
    pub fn new(object_id: Oid, kind: RenderKind) -> Self {
        Self { object_id, kind }
    }
}

struct CacheState {
    entries: LruCache<CacheKey, Rendered>,
    pending: HashSet<CacheKey>,
    hits: u64,
    renders: u64,
}

pub struct RenderCache {
    state: Mutex<CacheState>,
    ready: Condvar,
}

impl RenderCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                pending: HashSet::new(),
                hits: 0,
                renders: 0,
            }),
            ready: Condvar::new(),
        }
    }

    /// Return the cached render for `key`, or run `render` exactly once
    /// across concurrent callers and cache its output.
    pub fn get_or_render<F>(&self, key: CacheKey, render: F) -> Result<Rendered>
    where
        F: FnOnce() -> Result<String>,
    {
        {
            let mut state = self.lock()?;
            loop {
                if let Some(hit) = state.entries.get(&key).cloned() {
                    state.hits += 1;
                    tracing::debug!("Render cache hit for {} ({:?})", key.object_id, key.kind);
                    return Ok(hit);
                }
                if !state.pending.contains(&key) {
                    state.pending.insert(key.clone());
                    break;
                }
                state = self.ready.wait(state).map_err(|_| AppError::lock_poisoned())?;
            }
        }

        let _pending = PendingRender { cache: self, key: &key };
        let rendered: Rendered = Arc::from(render()?);

        let mut state = self.lock()?;
        state.renders += 1;
        state.entries.put(key.clone(), Arc::clone(&rendered));
        drop(state);

        tracing::info!(
            "Rendered {} ({:?}): {} bytes",
            key.object_id,
            key.kind,
            rendered.len()
        );

        Ok(rendered)
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        CacheStats {
            entries: state.entries.len(),
            hits: state.hits,
            renders: state.renders,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, CacheState>> {
        self.state.lock().map_err(|_| AppError::lock_poisoned())
    }
}

/// Clears a pending marker and wakes waiters, whether the render finished,
/// failed, or unwound.
struct PendingRender<'a> {
    cache: &'a RenderCache,
    key: &'a CacheKey,
}

impl Drop for PendingRender<'_> {
    fn drop(&mut self) {
        let mut state = self.cache.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.pending.remove(self.key);
        drop(state);
        self.cache.ready.notify_all();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub renders: u64,
}
