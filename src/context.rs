//! Operation context
//!
//! Carries a caller-supplied deadline and a cancellation flag into every
//! store and backend call. Clones share the cancellation flag, so a caller
//! can keep one copy and cancel work running on another thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Result, StoreError};

/// Deadline and cancellation state for one logical operation
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    canceled: Arc<AtomicBool>,
}

impl Context {
    /// A context that never expires and is only canceled explicitly
    pub fn background() -> Self {
        Self::default()
    }

    /// A context expiring `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context expiring at `deadline`
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            canceled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancel this context and every clone of it
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::Release);
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when there is no deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Fail with `Canceled` or `DeadlineExceeded` if the operation should stop
    pub fn check(&self) -> Result<()> {
        if self.is_canceled() {
            return Err(StoreError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(StoreError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}
