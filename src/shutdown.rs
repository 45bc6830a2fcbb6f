//! Graceful shutdown on SIGINT and SIGTERM.
//!
//! Signal delivery only ever flips a shared flag. The main loop polls the flag
//! between one-second sleep chunks, so shutdown latency stays bounded no matter
//! how long the collection interval is.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// One-way RUNNING -> STOPPING switch shared between the signal task and the loop.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    stopping: Arc<AtomicBool>,
}

impl ShutdownFlag {
    /// Create a flag in the running state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown. Returns `true` only for the call that made the transition.
    pub fn request_stop(&self) -> bool {
        !self.stopping.swap(true, Ordering::SeqCst)
    }

    /// Whether shutdown has been requested.
    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }
}

/// Install SIGINT/SIGTERM handlers and spawn a task that flips `flag` on delivery.
///
/// Handlers are registered before this returns, so a signal sent right after
/// the call is already caught. Every delivery is logged; only the first one
/// changes state.
pub fn listen_for_signals(flag: ShutdownFlag) -> std::io::Result<JoinHandle<()>> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        Ok(tokio::spawn(async move {
            loop {
                let name = tokio::select! {
                    _ = sigint.recv() => "SIGINT",
                    _ = sigterm.recv() => "SIGTERM",
                };
                on_signal(&flag, name);
            }
        }))
    }

    #[cfg(not(unix))]
    {
        Ok(tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                on_signal(&flag, "Ctrl+C");
            }
        }))
    }
}

fn on_signal(flag: &ShutdownFlag, name: &str) {
    info!("Received signal: {}. Shutting down...", name);
    if !flag.request_stop() {
        debug!("Shutdown already requested");
    }
}
