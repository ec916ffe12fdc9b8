use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] fieldwork_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid work order ID: {0}")]
    InvalidWorkOrderId(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Not signed in. Run `fieldwork auth login --username <name> --password <password>`.")]
    NotSignedIn,
    #[error("Work order {0} has no PDF attached")]
    NoPdf(String),
    #[error("{0}")]
    NotAllowed(String),
}

impl CliError {
    /// Hint printed after the error when the session is gone.
    pub const fn login_hint(&self) -> Option<&'static str> {
        match self {
            Self::Core(fieldwork_core::Error::Unauthorized) => {
                Some("Run `fieldwork auth login` to sign in again.")
            }
            _ => None,
        }
    }
}
