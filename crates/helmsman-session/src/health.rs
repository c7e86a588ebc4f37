//! Caller-supplied UI health check.
//!
//! The remote application can be stuck behind an overlay (a modal, a
//! captcha, a re-login prompt) while every protocol call still succeeds.
//! The session runs the check after each evaluation and on every protocol
//! timeout so callers can tell the two situations apart.

use std::future::Future;

use futures::future::BoxFuture;
use thiserror::Error;

/// Result of a failed health check.
#[derive(Debug, Clone, Error)]
pub enum HealthCheckError {
    /// A blocking UI condition was detected. Propagated by the session.
    #[error("UI blocked: {0}")]
    UiBlocked(String),

    /// The check itself failed. Logged and ignored by the session.
    #[error("Health check failed: {0}")]
    Failed(String),
}

/// A zero-argument diagnostic.
///
/// Implemented for any `Fn() -> impl Future<Output = Result<(), HealthCheckError>>`
/// closure, so most callers never name this trait.
pub trait HealthCheck: Send + Sync {
    fn check(&self) -> BoxFuture<'_, Result<(), HealthCheckError>>;
}

impl<F, Fut> HealthCheck for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HealthCheckError>> + Send + 'static,
{
    fn check(&self) -> BoxFuture<'_, Result<(), HealthCheckError>> {
        Box::pin(self())
    }
}
