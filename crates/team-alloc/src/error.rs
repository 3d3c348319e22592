use crate::allocation::AllocationServiceError;
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use std::fmt;

/// Top-level failure surfaced by the service binary. HTTP handlers map
/// engine errors themselves; this type only reaches the CLI exit path.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Engine(AllocationServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {err}"),
            AppError::Telemetry(err) => write!(f, "telemetry error: {err}"),
            AppError::Io(err) => write!(f, "io error: {err}"),
            AppError::Engine(err) => write!(f, "allocation error: {err}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Engine(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<AllocationServiceError> for AppError {
    fn from(value: AllocationServiceError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_keep_their_detail_in_the_message() {
        let err: AppError =
            AllocationServiceError::Validation("team_size_hint must be a positive integer".into())
                .into();
        let message = err.to_string();
        assert!(message.starts_with("allocation error:"));
        assert!(message.contains("team_size_hint"));
    }

    #[test]
    fn io_errors_expose_their_source() {
        let err: AppError =
            std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken").into();
        let source = std::error::Error::source(&err).expect("io source preserved");
        assert!(source.to_string().contains("port taken"));
    }
}
