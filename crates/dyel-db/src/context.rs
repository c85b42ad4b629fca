//! Per-call cancellation and deadline.
//!
//! Every await inside a repository unit of work goes through
//! [`CallContext::step`], so a fired token or an elapsed deadline surfaces as
//! `RepoError::Canceled` at the next statement boundary. The repository then
//! rolls the open transaction back before returning.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{CancelReason, RepoError};

#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that never cancels on its own.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive from a shared token (e.g., server shutdown or Ctrl-C).
    #[must_use]
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Fail fast if the call has already been canceled or timed out.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Canceled` with the reason.
    pub fn check(&self) -> Result<(), RepoError> {
        if self.token.is_cancelled() {
            return Err(RepoError::Canceled(CancelReason::Canceled));
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(RepoError::Canceled(CancelReason::DeadlineExceeded));
        }
        Ok(())
    }

    /// Drive `fut` unless the call is canceled or its deadline passes first.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Canceled` if the token fires or the deadline
    /// elapses before `fut` completes. `fut` is dropped in that case.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, RepoError> {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            () = self.token.cancelled() => Err(RepoError::Canceled(CancelReason::Canceled)),
            () = deadline => Err(RepoError::Canceled(CancelReason::DeadlineExceeded)),
            out = fut => Ok(out),
        }
    }

    /// [`Self::run`] for fallible futures, flattening the error.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Canceled`, or the future's own error converted
    /// into `RepoError`.
    pub async fn step<F, T, E>(&self, fut: F) -> Result<T, RepoError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<RepoError>,
    {
        self.run(fut).await?.map_err(Into::into)
    }
}
