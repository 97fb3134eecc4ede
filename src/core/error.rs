use thiserror::Error;

#[derive(Error, Debug)]
pub enum VivariumError {
    #[error("Agent not found: {0}")]
    AgentNotFound(crate::core::types::AgentId),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    #[error("Subscriber error: {0}")]
    Subscriber(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VivariumError>;
