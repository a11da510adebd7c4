use thiserror::Error;

/// Error type for process tagging and termination.
///
/// These never reach queue callers: the worker logs them and degrades
/// (marks the task failed, or retries the kill on the next poll).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessControlError {
    #[error("Invalid process id: {0}")]
    InvalidPid(u32),

    #[error("Failed to place process {pid} in its own group: {reason}")]
    TagFailed { pid: u32, reason: String },

    #[error("Failed to kill process {pid}: {reason}")]
    KillFailed { pid: u32, reason: String },

    #[cfg(not(any(unix, windows)))]
    #[error("Unsupported platform: {0}")]
    Unsupported(String),
}
