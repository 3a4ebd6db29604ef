//! Cancellation contexts passed to every backend operation.
//!
//! Backends check the context exactly once per call, after the message id
//! has been validated and before any lock is taken or any I/O is issued.
//! A copy that has already started runs to completion.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why a context is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The context was cancelled explicitly.
    Cancelled,
    /// The context's deadline passed.
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("context cancelled"),
            Self::DeadlineExceeded => f.write_str("context deadline exceeded"),
        }
    }
}

/// A caller-supplied cancellation signal.
pub trait Context: Send + Sync {
    /// Returns the reason the context is done, or `None` while it is live.
    fn err(&self) -> Option<CancelReason>;

    /// Returns true once the context is done.
    fn is_done(&self) -> bool {
        self.err().is_some()
    }
}

/// A context that is never done.
#[derive(Debug, Clone, Copy, Default)]
pub struct Background;

impl Context for Background {
    fn err(&self) -> Option<CancelReason> {
        None
    }
}

/// A cloneable cancellation flag.
///
/// All clones share the same flag, so cancelling one cancels them all.
///
/// ```rust
/// use retryspool_data::{CancelToken, Context};
///
/// let token = CancelToken::new();
/// let worker = token.clone();
/// token.cancel();
/// assert!(worker.is_done());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a live token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token and every clone of it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true if the token was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Context for CancelToken {
    fn err(&self) -> Option<CancelReason> {
        self.is_cancelled().then_some(CancelReason::Cancelled)
    }
}

/// A context that is done once a point in time passes.
///
/// Optionally tied to a [`CancelToken`]; explicit cancellation is reported
/// ahead of an expired deadline.
#[derive(Debug, Clone)]
pub struct Deadline {
    at: Instant,
    token: Option<CancelToken>,
}

impl Deadline {
    /// Creates a deadline at the given instant.
    #[must_use]
    pub fn at(at: Instant) -> Self {
        Self { at, token: None }
    }

    /// Creates a deadline `timeout` from now.
    #[must_use]
    pub fn after(timeout: Duration) -> Self {
        Self::at(Instant::now() + timeout)
    }

    /// Ties the deadline to a cancellation token.
    #[must_use]
    pub fn with_token(mut self, token: CancelToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Returns the instant the deadline expires.
    #[must_use]
    pub fn instant(&self) -> Instant {
        self.at
    }
}

impl Context for Deadline {
    fn err(&self) -> Option<CancelReason> {
        if self.token.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Some(CancelReason::Cancelled);
        }
        (Instant::now() >= self.at).then_some(CancelReason::DeadlineExceeded)
    }
}

/// Fails with [`crate::DataError::Cancelled`] if the context is done.
pub(crate) fn check(ctx: &dyn Context) -> crate::DataResult<()> {
    match ctx.err() {
        Some(reason) => Err(crate::DataError::Cancelled(reason)),
        None => Ok(()),
    }
}
