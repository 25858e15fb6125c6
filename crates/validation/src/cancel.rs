//! Cooperative cancellation helpers

use pkgsig_errors::Error;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Fail with [`Error::Cancelled`] if the token has fired.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] when cancellation was requested.
pub fn ensure_active(cancel: &CancellationToken) -> Result<(), Error> {
    if cancel.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}

/// Drive `fut` to completion unless the token fires first.
///
/// An already-cancelled token never polls `fut`.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] on cancellation, otherwise whatever `fut` returns.
pub async fn run_cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    ensure_active(cancel)?;
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Error::Cancelled),
        result = fut => result,
    }
}
