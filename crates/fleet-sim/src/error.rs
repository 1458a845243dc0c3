use fleet_state::StateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("malformed update message: {0}")]
    MalformedMessage(#[from] serde_json::Error),

    #[error("failed to encode update message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("unsupported message type {0:?}")]
    UnsupportedMessage(String),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("engine configuration error: {0}")]
    Config(String),

    #[error("engine task has stopped")]
    EngineStopped,
}

pub type SimResult<T> = Result<T, SimError>;
