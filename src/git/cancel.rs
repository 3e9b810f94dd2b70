//! Caller-supplied cancellation for long history walks.
//!
//! A `Cancellation` trips when its deadline passes or when any clone calls
//! `cancel()`. The HTTP layer holds a `CancelOnDrop` guard so an abandoned
//! request stops the walk running on the blocking pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Cancellation {
    /// Never trips unless `cancel()` is called.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Err(`Cancelled`) once tripped; called between walk steps.
    pub fn check(&self) -> Result<()> {
        if self.flag.load(Ordering::Acquire) {
            return Err(AppError::Cancelled("request abandoned".to_string()));
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(AppError::Cancelled("walk deadline exceeded".to_string()));
        }
        Ok(())
    }

    /// Guard that cancels this handle when dropped.
    pub fn guard(&self) -> CancelOnDrop {
        CancelOnDrop(self.clone())
    }
}

pub struct CancelOnDrop(Cancellation);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = Cancellation::new();
        let clone = token.clone();
        assert!(clone.check().is_ok());

        token.cancel();
        assert!(clone.is_cancelled());
        assert!(matches!(clone.check(), Err(AppError::Cancelled(_))));
    }

    #[test]
    fn elapsed_deadline_trips() {
        let token = Cancellation::with_timeout(Duration::ZERO);
        assert!(token.is_cancelled());
    }

    #[test]
    fn dropping_guard_cancels() {
        let token = Cancellation::new();
        {
            let _guard = token.guard();
            assert!(!token.is_cancelled());
        }
        assert!(token.is_cancelled());
    }
}
