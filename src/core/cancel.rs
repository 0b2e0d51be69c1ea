//! Per-attempt cancellation
//!
//! Every fetch attempt gets its own [`FetchToken`]. A state machine keeps at
//! most one live token in its [`AttemptSlot`]; beginning a new attempt cancels
//! the previous one before the new request is issued, and only the live
//! attempt's settlement may write state.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Identity of one fetch attempt within a state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttemptId(u64);

impl AttemptId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Cancellation signal of one attempt, passed to the port call.
#[derive(Debug, Clone)]
pub struct FetchToken {
    attempt: AttemptId,
    inner: CancellationToken,
}

impl FetchToken {
    pub fn new(attempt: AttemptId) -> Self {
        Self {
            attempt,
            inner: CancellationToken::new(),
        }
    }

    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Resolves once the attempt has been retired.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.inner.cancelled()
    }
}

/// Tokens compare by attempt; the cancellation state is not part of identity.
impl PartialEq for FetchToken {
    fn eq(&self, other: &Self) -> bool {
        self.attempt == other.attempt
    }
}

impl Eq for FetchToken {}

/// Holder of the single live attempt of a state machine.
///
/// Dropping the slot retires the live attempt.
#[derive(Debug, Default)]
pub struct AttemptSlot {
    issued: u64,
    live: Option<FetchToken>,
}

impl AttemptSlot {
    pub fn new() -> Self {
        Default::default()
    }

    /// Retire the live attempt, if any, and start a new one.
    pub fn begin(&mut self) -> FetchToken {
        self.retire();
        self.issued += 1;
        let token = FetchToken::new(AttemptId(self.issued));
        self.live = Some(token.clone());
        token
    }

    /// Whether `attempt` may still write state.
    pub fn is_live(&self, attempt: AttemptId) -> bool {
        self.live
            .as_ref()
            .is_some_and(|token| token.attempt == attempt && !token.is_cancelled())
    }

    /// Consume the live attempt if `attempt` is it. Returns false for stale
    /// or cancelled attempts, which must then be ignored.
    pub fn settle(&mut self, attempt: AttemptId) -> bool {
        if self.is_live(attempt) {
            self.live = None;
            true
        } else {
            false
        }
    }

    /// Cancel the live attempt without starting another.
    pub fn retire(&mut self) {
        if let Some(token) = self.live.take() {
            token.cancel();
        }
    }

    pub fn live(&self) -> Option<&FetchToken> {
        self.live.as_ref()
    }

    pub fn has_live(&self) -> bool {
        self.live.is_some()
    }
}

impl Drop for AttemptSlot {
    fn drop(&mut self) {
        self.retire();
    }
}
