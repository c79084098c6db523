use crate::domain::model::PortProfile;
use crate::utils::error::{Result, ServerError};
use std::collections::HashSet;

/// Lowest status a final response may carry; 1xx codes are interim only.
pub const MIN_STATUS_CODE: u16 = 200;
pub const MAX_STATUS_CODE: u16 = 999;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ServerError::invalid_value(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

pub fn validate_non_negative(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(ServerError::invalid_value(
            field_name,
            value,
            "Value must be a finite number of seconds",
        ));
    }
    if value < 0.0 {
        return Err(ServerError::invalid_value(
            field_name,
            value,
            "Value must not be negative",
        ));
    }
    Ok(())
}

pub fn validate_unique_ports(profiles: &[PortProfile]) -> Result<()> {
    if profiles.is_empty() {
        return Err(ServerError::MissingConfigError {
            field: "SERVER_PORT_1".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for profile in profiles {
        if !seen.insert(profile.port) {
            return Err(ServerError::invalid_value(
                "port",
                profile.port,
                "Each port may only be configured once",
            ));
        }
    }
    Ok(())
}

impl Validate for PortProfile {
    fn validate(&self) -> Result<()> {
        validate_range("port", self.port, 1, u16::MAX)?;
        validate_range("status_code", self.status_code, MIN_STATUS_CODE, MAX_STATUS_CODE)?;
        validate_non_negative("response_delay", self.response_delay_secs)?;
        if std::time::Duration::try_from_secs_f64(self.response_delay_secs).is_err() {
            return Err(ServerError::invalid_value(
                "response_delay",
                self.response_delay_secs,
                "Delay is too large",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(port: u16) -> PortProfile {
        PortProfile::new(port)
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("status_code", 200u16, 100, 999).is_ok());
        assert!(validate_range("status_code", 99u16, 100, 999).is_err());
        assert!(validate_range("status_code", 1000u16, 100, 999).is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("response_delay", 0.0).is_ok());
        assert!(validate_non_negative("response_delay", 2.5).is_ok());
        assert!(validate_non_negative("response_delay", -0.1).is_err());
        assert!(validate_non_negative("response_delay", f64::NAN).is_err());
        assert!(validate_non_negative("response_delay", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_unique_ports() {
        assert!(validate_unique_ports(&[profile(9001), profile(9002)]).is_ok());
        assert!(validate_unique_ports(&[profile(9001), profile(9001)]).is_err());

        let err = validate_unique_ports(&[]).unwrap_err();
        assert!(matches!(err, ServerError::MissingConfigError { .. }));
    }

    #[test]
    fn test_profile_validation() {
        assert!(profile(8080).validate().is_ok());
        assert!(profile(0).validate().is_err());

        let mut bad_status = profile(8080);
        bad_status.status_code = 42;
        assert!(bad_status.validate().is_err());

        let mut interim_status = profile(8080);
        interim_status.status_code = 101;
        assert!(interim_status.validate().is_err());

        let mut bad_delay = profile(8080);
        bad_delay.response_delay_secs = -3.0;
        assert!(bad_delay.validate().is_err());
    }
}
