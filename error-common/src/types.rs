use thiserror::Error;

/// Errors raised while starting or running the Menagerie process
#[derive(Error, Debug)]
pub enum MenagerieError {
    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The entity store could not be opened or migrated
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Outbound HTTP client setup failed
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Server bind or serve failure
    #[error("Server error: {0}")]
    ServerError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MenagerieError {
    /// Stable code for the failure category
    pub fn code(&self) -> &'static str {
        use crate::codes;

        match self {
            Self::ConfigError(_) => codes::system::CONFIGURATION_INVALID,
            Self::StorageError(_) => codes::storage::BACKEND_FAILURE,
            Self::NetworkError(_) => codes::upstream::CLIENT_SETUP_FAILED,
            Self::ServerError(_) | Self::Io(_) => codes::system::SERVER_FAILURE,
            Self::Other(_) => codes::system::INTERNAL_ERROR,
        }
    }
}

/// Result type alias for Menagerie process operations
pub type Result<T> = std::result::Result<T, MenagerieError>;

/// Log a process-level error with its code
pub fn log_error(context: &str, error: &MenagerieError) {
    tracing::error!(
        context = context,
        error_code = error.code(),
        error = %error,
        "Menagerie error occurred"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_carry_configuration_code() {
        let error = MenagerieError::ConfigError("missing client id".to_string());
        assert_eq!(error.code(), "SYS_9001");
        assert_eq!(error.to_string(), "Configuration error: missing client id");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let error: MenagerieError = io.into();
        assert_eq!(error.code(), "SYS_9002");
    }
}
