//! Error types for the scheduling core.

use thiserror::Error;

/// Errors raised by task/event store implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        StoreError::Backend(format!("{err:#}"))
    }
}

/// Errors raised while starting or driving a pointer gesture.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GestureError {
    #[error("A gesture is already in progress")]
    GestureInProgress,

    #[error("Event {0} cannot be dragged")]
    NotDraggable(String),
}

/// Errors raised when a committed gesture is applied to the stores.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Entity no longer exists: {0}")]
    EntityNotFound(String),

    #[error("No pending write for event {0}")]
    NoPendingWrite(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised while loading or validating settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Invalid settings: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine a configuration directory")]
    NoConfigDir,
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type ScheduleResult<T> = Result<T, ScheduleError>;
