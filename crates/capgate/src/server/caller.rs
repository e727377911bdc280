//! Per-request cancellation.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tokio_util::sync::{CancellationToken, DropGuard};

use super::AppState;

/// Cancellation handle for one request.
///
/// The token is a child of the server's shutdown token and is cancelled when
/// the handler future is dropped, which is what happens when the client
/// disconnects mid-request.
pub struct Caller {
    token: CancellationToken,
    _guard: DropGuard,
}

impl Caller {
    fn new(parent: &CancellationToken) -> Self {
        let token = parent.child_token();
        let guard = token.clone().drop_guard();
        Self {
            token,
            _guard: guard,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Caller::new(&state.shutdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_cancels_token() {
        let shutdown = CancellationToken::new();
        let caller = Caller::new(&shutdown);
        let token = caller.token().clone();
        assert!(!token.is_cancelled());

        drop(caller);
        assert!(token.is_cancelled());
        assert!(!shutdown.is_cancelled());
    }

    #[test]
    fn test_shutdown_reaches_caller() {
        let shutdown = CancellationToken::new();
        let caller = Caller::new(&shutdown);
        shutdown.cancel();
        assert!(caller.token().is_cancelled());
    }
}
