use thiserror::Error;

/// Errors returned by queue and registry operations.
///
/// Each variant is a distinct kind so that transport layers can map it onto
/// their own status codes without losing information; see
/// [`as_label`](QueueError::as_label).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Unknown queue name or task id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate queue name
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Operation not valid for the queue's current running state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A listed collection currently holds no entries
    ///
    /// Kept apart from [`QueueError::NotFound`] so clients can tell "nothing
    /// there yet" from a failed lookup.
    #[error("Empty: {0}")]
    Empty(String),

    /// Process spawn/monitor failure or exhausted internal resource
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A caller-supplied value outside its accepted range
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl QueueError {
    /// Returns a short stable label (snake_case) for logs and status mapping.
    ///
    /// # Example
    /// ```
    /// use stq::tasks::error::QueueError;
    ///
    /// let err = QueueError::Empty("pending list is empty".to_string());
    /// assert_eq!(err.as_label(), "empty");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            QueueError::NotFound(_) => "not_found",
            QueueError::AlreadyExists(_) => "already_exists",
            QueueError::InvalidState(_) => "invalid_state",
            QueueError::Empty(_) => "empty",
            QueueError::Internal(_) => "internal",
            QueueError::InvalidConfiguration(_) => "invalid_configuration",
            QueueError::InvalidInput(_) => "invalid_input",
        }
    }
}
