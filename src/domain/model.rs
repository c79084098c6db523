use serde::Serialize;
use std::time::Duration;

pub const STARTUP_MESSAGE: &str = "Server is starting up";

/// Canned behavior for one listening port.
#[derive(Debug, Clone, PartialEq)]
pub struct PortProfile {
    pub port: u16,
    pub response_body: String,
    pub status_code: u16,
    pub response_delay_secs: f64,
}

impl PortProfile {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            response_body: Self::default_response_body(port),
            status_code: 200,
            response_delay_secs: 0.0,
        }
    }

    pub fn default_response_body(port: u16) -> String {
        format!("Hello from port {}!", port)
    }

    pub fn with_response(mut self, body: impl Into<String>) -> Self {
        self.response_body = body.into();
        self
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn with_delay(mut self, seconds: f64) -> Self {
        self.response_delay_secs = seconds;
        self
    }

    /// Artificial latency applied to ready responses. Out-of-range values
    /// collapse to zero; loaders reject them before a profile gets here.
    pub fn response_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.response_delay_secs).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub profiles: Vec<PortProfile>,
    pub startup_delay: Duration,
}

/// Body returned while the readiness gate is closed.
#[derive(Debug, Serialize)]
pub struct StartupBody<'a> {
    pub message: &'a str,
    pub status: u16,
    pub path: &'a str,
    pub port: u16,
    pub startup_remaining: u64,
}

/// Body returned once the server is ready.
#[derive(Debug, Serialize)]
pub struct ReadyBody<'a> {
    pub message: &'a str,
    pub status: u16,
    pub path: &'a str,
    pub port: u16,
    pub response_delay: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_defaults() {
        let profile = PortProfile::new(8080);
        assert_eq!(profile.response_body, "Hello from port 8080!");
        assert_eq!(profile.status_code, 200);
        assert_eq!(profile.response_delay(), Duration::ZERO);
    }

    #[test]
    fn test_fractional_delay() {
        let profile = PortProfile::new(8080).with_delay(0.25);
        assert_eq!(profile.response_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_delay_collapses_to_zero() {
        let profile = PortProfile::new(8080).with_delay(-1.0);
        assert_eq!(profile.response_delay(), Duration::ZERO);
    }
}
