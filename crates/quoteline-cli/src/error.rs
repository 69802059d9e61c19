use thiserror::Error;

use quoteline_core::{SchedulerError, SourceError, SourceErrorKind, ValidationError};
use quoteline_warehouse::WarehouseError;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] WarehouseError),

    #[error("quote provider error: {0}")]
    Source(#[from] SourceError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<SchedulerError> for CliError {
    fn from(error: SchedulerError) -> Self {
        match error {
            SchedulerError::Store(error) => Self::Store(error),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(_) => 2,
            Self::NotFound(_) => 2,
            Self::Store(_) => 3,
            Self::Source(error) => {
                if matches!(error.kind(), SourceErrorKind::InvalidRequest) {
                    2
                } else {
                    5
                }
            }
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
