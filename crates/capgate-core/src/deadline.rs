//! Cancellation scopes with an optional deadline.
//!
//! A [`CancelScope`] ends at the earliest of its parent token firing and its
//! deadline passing. Tightening a scope derives a child token, so cancelling
//! the child never touches the parent, while cancelling the parent reaches
//! every child.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a scoped future did not finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    /// The scope's token (or one of its ancestors) was cancelled.
    Cancelled,
    /// The scope's deadline passed.
    DeadlineElapsed,
}

/// A cancellation token plus an optional absolute deadline.
#[derive(Debug, Clone)]
pub struct CancelScope {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CancelScope {
    /// A scope bounded only by `token`.
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Derive a child scope that also ends `ceiling` from now.
    pub fn with_ceiling(&self, ceiling: Duration) -> Self {
        self.with_deadline(Instant::now() + ceiling)
    }

    /// Derive a child scope ending at the earlier of `deadline` and this
    /// scope's own deadline.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Token observed by work running inside the scope.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Drive `fut` until it completes or the scope ends.
    ///
    /// When the deadline passes the scope's token is cancelled before
    /// returning, so adapters still holding it observe the signal.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, Interrupted>
    where
        F: Future,
    {
        let expiry = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Interrupted::Cancelled),
            _ = expiry => {
                self.token.cancel();
                Err(Interrupted::DeadlineElapsed)
            }
            output = fut => Ok(output),
        }
    }
}
