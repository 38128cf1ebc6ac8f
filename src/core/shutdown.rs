//! Operator interrupt plumbing
//!
//! `main` turns SIGINT/SIGTERM into a `watch` flag. Long waits (cluster polling, tunnel
//! observation and supervision, the simulator loop) select on [`wait_for_shutdown`].

use tokio::sync::watch;

/// Whether shutdown has already been requested
pub fn is_shutdown_requested(signal: &watch::Receiver<bool>) -> bool {
    *signal.borrow()
}

/// Resolves once shutdown has been requested
///
/// Never resolves if the sender is dropped without requesting shutdown.
pub async fn wait_for_shutdown(signal: &mut watch::Receiver<bool>) {
    loop {
        if *signal.borrow_and_update() {
            return;
        }
        if signal.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// A receiver that never fires, for callers without an interrupt source
pub fn never() -> watch::Receiver<bool> {
    let (_tx, rx) = watch::channel(false);
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_resolves_after_send() {
        let (tx, mut rx) = watch::channel(false);
        let waiter = tokio::spawn(async move {
            wait_for_shutdown(&mut rx).await;
        });
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_already_set() {
        let (_tx, mut rx) = watch::channel(true);
        tokio::time::timeout(Duration::from_millis(100), wait_for_shutdown(&mut rx))
            .await
            .unwrap();
        assert!(is_shutdown_requested(&rx));
    }

    #[tokio::test]
    async fn test_never_does_not_fire() {
        let mut rx = never();
        let result =
            tokio::time::timeout(Duration::from_millis(50), wait_for_shutdown(&mut rx)).await;
        assert!(result.is_err());
    }
}
