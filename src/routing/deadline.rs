use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{GatewalkError, Result};

/// Shared flag that lets another thread abort an in-flight search.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Bound on how long a search may run: an optional expiry and an optional token.
#[derive(Debug, Clone, Default)]
pub struct Deadline {
    expires_at: Option<Instant>,
    token: Option<CancelToken>,
}

impl Deadline {
    /// No expiry, no token.
    pub fn none() -> Self {
        Self::default()
    }

    /// Expire `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            expires_at: Some(Instant::now() + timeout),
            token: None,
        }
    }

    /// Expire after `timeout_ms`, or never when it is 0.
    pub fn from_millis(timeout_ms: u64) -> Self {
        if timeout_ms == 0 {
            Self::none()
        } else {
            Self::after(Duration::from_millis(timeout_ms))
        }
    }

    pub fn with_token(mut self, token: CancelToken) -> Self {
        self.token = Some(token);
        self
    }

    /// `Err(Cancelled)` once the token fired or the expiry passed.
    pub fn check(&self) -> Result<()> {
        if self.token.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(GatewalkError::Cancelled);
        }
        if self.expires_at.is_some_and(|at| Instant::now() >= at) {
            return Err(GatewalkError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_never_expires() {
        assert!(Deadline::none().check().is_ok());
        assert!(Deadline::from_millis(0).check().is_ok());
    }

    #[test]
    fn test_token_cancels() {
        let token = CancelToken::new();
        let deadline = Deadline::none().with_token(token.clone());
        assert!(deadline.check().is_ok());
        token.cancel();
        assert!(matches!(deadline.check(), Err(GatewalkError::Cancelled)));
    }

    #[test]
    fn test_elapsed_deadline() {
        let deadline = Deadline::after(Duration::ZERO);
        assert!(matches!(deadline.check(), Err(GatewalkError::Cancelled)));
    }
}
