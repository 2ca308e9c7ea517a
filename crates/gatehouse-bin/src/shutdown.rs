// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Graceful shutdown coordination.
//!
//! The coordinator turns OS signals (SIGTERM, SIGINT, SIGQUIT on Unix, Ctrl+C
//! elsewhere) into a broadcast that the HTTP server's graceful shutdown
//! future listens on.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::broadcast;
use tracing::{error, info};

// =============================================================================
// ShutdownCoordinator
// =============================================================================

/// Coordinates graceful shutdown.
///
/// # Example
///
/// ```ignore
/// use gatehouse_bin::shutdown::ShutdownCoordinator;
///
/// let coordinator = ShutdownCoordinator::new();
/// let signal = coordinator.shutdown_signal();
///
/// tokio::spawn({
///     let coordinator = coordinator.clone();
///     async move { coordinator.wait_for_shutdown().await }
/// });
///
/// server.run_with_shutdown(signal).await?;
/// ```
#[derive(Clone)]
pub struct ShutdownCoordinator {
    sender: broadcast::Sender<()>,
    shutdown_initiated: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    /// Creates a new shutdown coordinator.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            sender,
            shutdown_initiated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Subscribes to shutdown notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Creates a future that resolves when shutdown is initiated.
    ///
    /// Resolves immediately if shutdown already happened.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        let mut receiver = self.sender.subscribe();
        let shutdown_initiated = self.shutdown_initiated.clone();

        ShutdownSignal {
            inner: Box::pin(async move {
                if shutdown_initiated.load(Ordering::SeqCst) {
                    return;
                }
                let _ = receiver.recv().await;
            }),
        }
    }

    /// Initiates shutdown. Subsequent calls are no-ops.
    pub fn initiate_shutdown(&self) {
        if self
            .shutdown_initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Shutdown initiated");
            let _ = self.sender.send(());
        }
    }

    /// Returns true if shutdown has been initiated.
    pub fn is_shutdown_initiated(&self) -> bool {
        self.shutdown_initiated.load(Ordering::SeqCst)
    }

    /// Waits for an OS signal, then initiates shutdown.
    ///
    /// If no signal handler can be installed, the error is logged and this
    /// future never resolves; shutdown can still be initiated manually.
    pub async fn wait_for_shutdown(&self) {
        if self.is_shutdown_initiated() {
            return;
        }

        wait_for_os_signal().await;
        self.initiate_shutdown();
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn wait_for_os_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let kinds = [
        (SignalKind::terminate(), "SIGTERM"),
        (SignalKind::interrupt(), "SIGINT"),
        (SignalKind::quit(), "SIGQUIT"),
    ];

    let mut streams = Vec::with_capacity(kinds.len());
    for (kind, name) in kinds {
        match signal(kind) {
            Ok(stream) => streams.push((stream, name)),
            Err(e) => error!(signal = name, error = %e, "Failed to register signal handler"),
        }
    }

    if streams.is_empty() {
        std::future::pending::<()>().await;
    }

    let received = std::future::poll_fn(|cx| {
        for (stream, name) in streams.iter_mut() {
            if stream.poll_recv(cx).is_ready() {
                return Poll::Ready(*name);
            }
        }
        Poll::Pending
    })
    .await;

    info!(signal = received, "Received shutdown signal");
}

#[cfg(not(unix))]
async fn wait_for_os_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(signal = "ctrl-c", "Received shutdown signal"),
        Err(e) => {
            error!(error = %e, "Failed to register Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// ShutdownSignal
// =============================================================================

/// A future that resolves when shutdown is initiated.
///
/// Suitable for axum's `with_graceful_shutdown`.
pub struct ShutdownSignal {
    inner: Pin<Box<dyn Future<Output = ()> + Send>>,
}

impl Future for ShutdownSignal {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

// =============================================================================
// Tests
// =============================================================================
