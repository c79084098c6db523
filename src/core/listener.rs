use crate::core::dispatcher::Dispatcher;
use crate::core::readiness::ReadinessGate;
use crate::domain::model::PortProfile;
use crate::utils::error::{Result, ServerError};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(250);

/// One bound port and the connections it serves.
#[derive(Debug)]
pub struct Listener {
    profile: Arc<PortProfile>,
    socket: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    pub async fn bind(host: IpAddr, profile: PortProfile) -> Result<Self> {
        let port = profile.port;
        let socket = TcpListener::bind(SocketAddr::new(host, port))
            .await
            .map_err(|source| ServerError::BindError { port, source })?;
        let local_addr = socket
            .local_addr()
            .map_err(|source| ServerError::BindError { port, source })?;

        Ok(Self {
            profile: Arc::new(profile),
            socket,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn profile(&self) -> &PortProfile {
        &self.profile
    }

    /// Accepts connections until `shutdown` fires, then closes the socket and
    /// waits up to `drain_timeout` for open connections to finish.
    pub async fn serve(
        self,
        gate: Arc<ReadinessGate>,
        shutdown: CancellationToken,
        drain_timeout: Duration,
    ) {
        let port = self.profile.port;
        let dispatcher = Dispatcher::new(self.profile.clone(), gate);
        let connections = TaskTracker::new();

        loop {
            let (stream, peer) = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                accepted = self.socket.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        // Usually fd exhaustion; retrying at once would spin.
                        tracing::warn!(port, "⚠️ Failed to accept connection: {}", e);
                        if back_off_after_accept_error(&shutdown).await {
                            continue;
                        }
                        break;
                    }
                },
            };

            tracing::debug!(port, %peer, "Connection accepted");
            connections.spawn(serve_connection(
                stream,
                dispatcher.clone(),
                shutdown.clone(),
            ));
        }

        drop(self.socket);
        connections.close();
        tracing::info!(
            port,
            in_flight = connections.len(),
            "Stopped accepting connections, draining"
        );

        if tokio::time::timeout(drain_timeout, connections.wait())
            .await
            .is_err()
        {
            tracing::warn!(
                port,
                abandoned = connections.len(),
                "⚠️ Drain timeout of {:?} elapsed, closing anyway",
                drain_timeout
            );
        }
    }
}

/// Pauses after a failed accept. Returns `false` if shutdown fired meanwhile.
async fn back_off_after_accept_error(shutdown: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = shutdown.cancelled() => false,
        _ = tokio::time::sleep(ACCEPT_ERROR_BACKOFF) => true,
    }
}

async fn serve_connection(stream: TcpStream, dispatcher: Dispatcher, shutdown: CancellationToken) {
    let service = service_fn(move |request| {
        let dispatcher = dispatcher.clone();
        async move { Ok::<_, Infallible>(dispatcher.dispatch(request).await) }
    });

    let connection = http1::Builder::new()
        .keep_alive(true)
        .serve_connection(TokioIo::new(stream), service);
    let mut connection = std::pin::pin!(connection);

    let result = tokio::select! {
        result = connection.as_mut() => result,
        _ = shutdown.cancelled() => {
            // Finishes the in-flight request, if any, then closes.
            connection.as_mut().graceful_shutdown();
            connection.as_mut().await
        }
    };

    // Client disconnects only affect this connection.
    if let Err(e) = result {
        if !e.is_incomplete_message() {
            tracing::debug!("Connection closed with error: {}", e);
        }
    }
}
