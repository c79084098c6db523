use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind port {port}: {source}")]
    BindError {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl ServerError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn invalid_value(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfigValueError {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::BindError { port, .. } => {
                format!("Could not listen on port {port}; startup aborted")
            }
            Self::MissingConfigError { field } => {
                format!("Required setting {field} is not set")
            }
            Self::InvalidConfigValueError { field, value, .. } => {
                format!("Setting {field} has an invalid value: '{value}'")
            }
            Self::TomlError(_) => "The configuration file is not valid TOML".to_string(),
            Self::ConfigError { message } => message.clone(),
            Self::IoError(e) => format!("I/O failure: {e}"),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::BindError { .. } => {
                "Check that the port is free and that the process may bind to it".to_string()
            }
            Self::MissingConfigError { .. } => {
                "Set at least SERVER_PORT_1 or pass --config with a [[ports]] table".to_string()
            }
            Self::InvalidConfigValueError { reason, .. } => reason.clone(),
            Self::TomlError(e) => format!("Fix the configuration file: {}", e),
            Self::ConfigError { .. } => "Review the SERVER_PORT_* settings".to_string(),
            Self::IoError(_) => "Restart the server; the failure is logged above".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_error_names_port() {
        let bind = ServerError::BindError {
            port: 8080,
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        };
        assert!(bind.to_string().contains("8080"));
        assert!(bind.user_friendly_message().contains("8080"));
    }

    #[test]
    fn test_invalid_value_message_names_field() {
        let err = ServerError::invalid_value("RESPONSE_DELAY_2", "-1", "must not be negative");
        assert_eq!(
            err.to_string(),
            "Invalid value '-1' for RESPONSE_DELAY_2: must not be negative"
        );
        assert_eq!(err.recovery_suggestion(), "must not be negative");
        assert!(err.user_friendly_message().contains("RESPONSE_DELAY_2"));
    }
}
