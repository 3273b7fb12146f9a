use thiserror::Error;

/// Startup and infrastructure failures. Request handlers answer with their
/// own envelopes and never surface these to clients.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    #[error("Telemetry error: {0}")]
    TelemetryError(String),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}
