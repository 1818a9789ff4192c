use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] swapdesk_core::ValidationError),

    #[error(transparent)]
    Config(#[from] swapdesk_core::ConfigError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<swapdesk_core::CoreError> for CliError {
    fn from(error: swapdesk_core::CoreError) -> Self {
        match error {
            swapdesk_core::CoreError::Validation(error) => Self::Validation(error),
            swapdesk_core::CoreError::Serialization(error) => Self::Serialization(error),
            swapdesk_core::CoreError::Io(error) => Self::Io(error),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(_) => 2,
            Self::Command(_) => 2,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
