//! Signal-driven shutdown.
//!
//! A single [`CancellationToken`] is handed to every listener and to the
//! startup countdown. The first SIGINT/SIGTERM moves the coordinator from
//! `Running` to `ShuttingDown` and cancels the token; later signals are
//! logged and otherwise ignored.

use crate::utils::logger::utc_timestamp;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownPhase {
    Running = 0,
    ShuttingDown = 1,
    Stopped = 2,
}

impl From<u8> for ShutdownPhase {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Running,
            1 => Self::ShuttingDown,
            _ => Self::Stopped,
        }
    }
}

#[derive(Debug)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
    phase: AtomicU8,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            phase: AtomicU8::new(ShutdownPhase::Running as u8),
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn phase(&self) -> ShutdownPhase {
        ShutdownPhase::from(self.phase.load(Ordering::Acquire))
    }

    /// Starts the shutdown sequence. Only the first call has any effect and
    /// returns `true`.
    pub fn trigger(&self, reason: &str) -> bool {
        let started = self
            .phase
            .compare_exchange(
                ShutdownPhase::Running as u8,
                ShutdownPhase::ShuttingDown as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();

        if started {
            tracing::info!(
                "🛑 Shutdown requested ({}) at {}, starting graceful shutdown",
                reason,
                utc_timestamp()
            );
            self.token.cancel();
        } else {
            tracing::warn!("{} received while already shutting down, ignoring", reason);
        }
        started
    }

    pub fn mark_stopped(&self) {
        self.phase
            .store(ShutdownPhase::Stopped as u8, Ordering::Release);
    }

    /// Routes SIGINT and SIGTERM (Ctrl-C elsewhere) into [`Self::trigger`].
    pub fn install_signal_handlers(self: &Arc<Self>) -> std::io::Result<()> {
        let coordinator = Arc::clone(self);

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm = signal(SignalKind::terminate())?;
            let mut sigint = signal(SignalKind::interrupt())?;

            tokio::spawn(async move {
                loop {
                    let name = tokio::select! {
                        Some(()) = sigterm.recv() => "SIGTERM",
                        Some(()) = sigint.recv() => "SIGINT",
                        else => break,
                    };
                    coordinator.trigger(name);
                }
            });
        }

        #[cfg(not(unix))]
        {
            tokio::spawn(async move {
                while tokio::signal::ctrl_c().await.is_ok() {
                    coordinator.trigger("Ctrl-C");
                }
            });
        }

        Ok(())
    }
}
