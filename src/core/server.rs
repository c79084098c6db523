use crate::core::listener::Listener;
use crate::core::readiness::ReadinessGate;
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::ConfigProvider;
use crate::config::{DEFAULT_BIND_ADDRESS, DEFAULT_DRAIN_TIMEOUT};
use crate::utils::error::{Result, ServerError};
use crate::utils::logger::utc_timestamp;
use crate::utils::validation::{validate_unique_ports, Validate};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::Instrument;

pub struct MockServer<C: ConfigProvider> {
    config: C,
    bind_address: IpAddr,
    drain_timeout: Duration,
}

impl<C: ConfigProvider> MockServer<C> {
    pub fn new(config: C) -> Self {
        Self {
            config,
            bind_address: DEFAULT_BIND_ADDRESS,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    pub fn with_bind_address(mut self, bind_address: IpAddr) -> Self {
        self.bind_address = bind_address;
        self
    }

    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// Opens the readiness window and binds every configured port. Nothing is
    /// served until [`BoundServer::run`]; any failure here aborts startup.
    pub async fn bind(&self) -> Result<BoundServer> {
        let profiles = self.config.port_profiles();
        validate_unique_ports(profiles)?;
        profiles.iter().try_for_each(Validate::validate)?;

        let gate = Arc::new(ReadinessGate::new(self.config.startup_delay()));

        let mut listeners = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let listener = Listener::bind(self.bind_address, profile.clone()).await?;
            tracing::info!("🌐 Server is listening on {}", listener.local_addr());
            listeners.push(listener);
        }

        Ok(BoundServer {
            listeners,
            gate,
            drain_timeout: self.drain_timeout,
        })
    }
}

/// Every port bound, readiness window running, not yet serving.
#[derive(Debug)]
pub struct BoundServer {
    listeners: Vec<Listener>,
    gate: Arc<ReadinessGate>,
    drain_timeout: Duration,
}

impl BoundServer {
    pub fn local_addrs(&self) -> Vec<SocketAddr> {
        self.listeners.iter().map(Listener::local_addr).collect()
    }

    pub fn gate(&self) -> Arc<ReadinessGate> {
        self.gate.clone()
    }

    /// Serves until the coordinator is triggered, then drains every listener.
    ///
    /// A listener that exits on its own triggers the same shutdown and is
    /// reported as an error once cleanup has finished.
    pub async fn run(self, coordinator: &ShutdownCoordinator) -> Result<()> {
        let shutdown = coordinator.token();
        let mut listeners = JoinSet::new();

        for listener in self.listeners {
            let span = tracing::info_span!("listener", port = listener.profile().port);
            listeners.spawn(
                listener
                    .serve(self.gate.clone(), shutdown.clone(), self.drain_timeout)
                    .instrument(span),
            );
        }

        tracing::info!(
            "🚀 Starting initialization phase, startup delay {}s",
            self.gate.startup_delay().as_secs()
        );
        let gate = self.gate.clone();
        let serving = async {
            if gate.run_countdown(&shutdown).await {
                tracing::info!(
                    "✅ All servers are ready to accept connections at {}",
                    utc_timestamp()
                );
            }
            shutdown.cancelled().await;
        };

        let mut fault = None;
        tokio::select! {
            _ = serving => {}
            Some(exited) = listeners.join_next() => {
                let reason = match exited {
                    Ok(()) => "listener exited unexpectedly".to_string(),
                    Err(e) => format!("listener task failed: {}", e),
                };
                tracing::error!("❌ {}", reason);
                coordinator.trigger(&reason);
                fault = Some(reason);
            }
        }

        tracing::info!("Stopping HTTP servers...");
        while let Some(exited) = listeners.join_next().await {
            if let Err(e) = exited {
                tracing::error!("❌ Listener task failed during drain: {}", e);
            }
        }
        coordinator.mark_stopped();
        tracing::info!("✅ All servers stopped, graceful shutdown completed");

        match fault {
            Some(reason) => Err(ServerError::IoError(std::io::Error::other(reason))),
            None => Ok(()),
        }
    }
}
