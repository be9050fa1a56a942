//! Graceful Shutdown Handler
//!
//! Coordinates shutdown between the HTTP server and in-flight completions.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Shutdown coordinator.
///
/// `shutdown()` stops the server from accepting new requests. Requests
/// still running get until the drain timeout to finish, after which their
/// cancellation tokens fire and the fallback loop stops at the next
/// candidate boundary or in-flight call.
#[derive(Clone)]
pub struct ShutdownController {
    /// Fires when shutdown starts
    stop: CancellationToken,
    /// Parent of every request token
    abort: CancellationToken,
    active_requests: Arc<AtomicUsize>,
    drain_complete: Arc<Notify>,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self {
            stop: CancellationToken::new(),
            abort: CancellationToken::new(),
            active_requests: Arc::new(AtomicUsize::new(0)),
            drain_complete: Arc::new(Notify::new()),
        }
    }

    /// Initiate graceful shutdown. Idempotent.
    pub fn shutdown(&self) {
        if !self.stop.is_cancelled() {
            tracing::info!("initiating graceful shutdown");
            self.stop.cancel();
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Completes once shutdown has been initiated.
    pub async fn stopped(&self) {
        self.stop.cancelled().await
    }

    /// Cancel every request token handed out so far and from now on.
    pub fn abort_in_flight(&self) {
        if !self.abort.is_cancelled() {
            tracing::warn!(
                "aborting {} in-flight request(s)",
                self.active_requests()
            );
            self.abort.cancel();
        }
    }

    /// Token for one request, cancelled by [`abort_in_flight`](Self::abort_in_flight).
    pub fn request_token(&self) -> CancellationToken {
        self.abort.child_token()
    }

    pub fn active_requests(&self) -> usize {
        self.active_requests.load(Ordering::SeqCst)
    }

    /// Track a request for the lifetime of the returned guard.
    pub fn request_guard(&self) -> RequestGuard {
        self.active_requests.fetch_add(1, Ordering::SeqCst);
        RequestGuard {
            controller: self.clone(),
        }
    }

    fn request_ended(&self) {
        let prev = self.active_requests.fetch_sub(1, Ordering::SeqCst);
        if prev == 1 && self.is_shutdown() {
            self.drain_complete.notify_waiters();
        }
    }

    /// Wait for all requests to finish. Returns false on timeout.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let notified = self.drain_complete.notified();
        if self.active_requests() == 0 {
            return true;
        }

        tokio::select! {
            _ = notified => true,
            _ = tokio::time::sleep(timeout) => {
                tracing::warn!(
                    "drain timeout: {} requests still active",
                    self.active_requests()
                );
                false
            }
        }
    }

    /// Once shutdown starts, give requests `timeout` to drain, then abort them.
    pub fn spawn_drain_watchdog(&self, timeout: Duration) {
        let controller = self.clone();
        tokio::spawn(async move {
            controller.stopped().await;
            if !controller.wait_for_drain(timeout).await {
                controller.abort_in_flight();
            }
        });
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for an in-flight request.
pub struct RequestGuard {
    controller: ShutdownController,
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.controller.request_ended();
    }
}

/// Wait for Ctrl+C or SIGTERM, then initiate shutdown.
pub async fn shutdown_signal(controller: ShutdownController) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, initiating shutdown");
        }
        _ = controller.stopped() => {}
    }

    controller.shutdown();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_controller_new() {
        let controller = ShutdownController::new();
        assert!(!controller.is_shutdown());
        assert_eq!(controller.active_requests(), 0);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let controller = ShutdownController::default();

        controller.shutdown();
        assert!(controller.is_shutdown());

        controller.shutdown();
        assert!(controller.is_shutdown());
    }

    #[test]
    fn test_request_guard_tracking() {
        let controller = ShutdownController::new();

        let first = controller.request_guard();
        {
            let _second = controller.request_guard();
            assert_eq!(controller.active_requests(), 2);
        }
        assert_eq!(controller.active_requests(), 1);

        drop(first);
        assert_eq!(controller.active_requests(), 0);
    }

    #[test]
    fn test_shutdown_does_not_cancel_requests() {
        let controller = ShutdownController::new();
        let token = controller.request_token();

        controller.shutdown();
        assert!(!token.is_cancelled());

        controller.abort_in_flight();
        assert!(token.is_cancelled());
        assert!(controller.request_token().is_cancelled());
    }

    #[tokio::test]
    async fn test_stopped_completes_after_shutdown() {
        let controller = ShutdownController::new();
        let waiter = controller.clone();
        let handle = tokio::spawn(async move { waiter.stopped().await });

        controller.shutdown();

        let result = tokio::time::timeout(Duration::from_millis(100), handle).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_wait_for_drain_immediate() {
        let controller = ShutdownController::new();
        controller.shutdown();

        assert!(controller.wait_for_drain(Duration::from_millis(100)).await);
    }

    #[tokio::test]
    async fn test_wait_for_drain_with_requests() {
        let controller = ShutdownController::new();
        let guard = controller.request_guard();
        controller.shutdown();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            drop(guard);
        });

        assert!(controller.wait_for_drain(Duration::from_millis(500)).await);
    }

    #[tokio::test]
    async fn test_drain_watchdog_aborts_stragglers() {
        let controller = ShutdownController::new();
        let _guard = controller.request_guard();
        let token = controller.request_token();

        controller.spawn_drain_watchdog(Duration::from_millis(20));
        controller.shutdown();

        let cancelled = tokio::time::timeout(Duration::from_millis(500), token.cancelled()).await;
        assert!(cancelled.is_ok());
    }
}
