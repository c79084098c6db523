use crate::core::readiness::ReadinessGate;
use crate::domain::model::{PortProfile, ReadyBody, StartupBody, STARTUP_MESSAGE};
use crate::utils::json::to_json_line;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE, RETRY_AFTER};
use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

/// Answers every request on one port, whatever its method or path.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    profile: Arc<PortProfile>,
    gate: Arc<ReadinessGate>,
}

impl Dispatcher {
    pub fn new(profile: Arc<PortProfile>, gate: Arc<ReadinessGate>) -> Self {
        Self { profile, gate }
    }

    pub async fn dispatch<B>(&self, request: Request<B>) -> Response<Full<Bytes>> {
        let (parts, _) = request.into_parts();
        let path = parts
            .uri
            .path_and_query()
            .map(|target| target.as_str())
            .unwrap_or_else(|| parts.uri.path());

        let response = if self.gate.is_ready() {
            self.ready_response(path).await
        } else {
            self.startup_response(path)
        };

        tracing::info!(
            port = self.profile.port,
            "\"{} {} {:?}\" {}",
            parts.method,
            path,
            parts.version,
            response.status().as_u16()
        );
        response
    }

    fn startup_response(&self, path: &str) -> Response<Full<Bytes>> {
        let remaining = self.gate.remaining_startup_seconds();
        let body = StartupBody {
            message: STARTUP_MESSAGE,
            status: StatusCode::SERVICE_UNAVAILABLE.as_u16(),
            path,
            port: self.profile.port,
            startup_remaining: remaining,
        };

        let mut response = json_response(StatusCode::SERVICE_UNAVAILABLE, &body);
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(remaining));
        response
    }

    async fn ready_response(&self, path: &str) -> Response<Full<Bytes>> {
        let delay = self.profile.response_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let status = StatusCode::from_u16(self.profile.status_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ReadyBody {
            message: &self.profile.response_body,
            status: self.profile.status_code,
            path,
            port: self.profile.port,
            response_delay: self.profile.response_delay_secs,
        };
        json_response(status, &body)
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let mut response = match to_json_line(body) {
        Ok(bytes) => {
            let mut response = Response::new(Full::new(Bytes::from(bytes)));
            *response.status_mut() = status;
            response
        }
        Err(e) => {
            tracing::error!("❌ Failed to render response body: {}", e);
            let mut response = Response::new(Full::new(Bytes::new()));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    };
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
