use std::time::Duration;

use crate::tasks::error::QueueError;

/// Runtime tuning shared by every queue of a registry.
///
/// # Examples
///
/// ```rust
/// use stq::tasks::config::QueueConfig;
///
/// let config = QueueConfig::new().poll_interval_ms(100).read_buffer_size(8192);
/// assert!(config.validate().is_ok());
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// How often the output pump polls child liveness and the stop flag,
    /// and how long the worker waits for a pump signal before re-checking
    pub poll_interval_ms: u64,

    /// Size of each read from the child's stdout/stderr
    pub read_buffer_size: usize,

    /// Capacity of the channel carrying output chunks from pump to worker
    pub relay_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            poll_interval_ms: 500,
            read_buffer_size: 4096,
            relay_capacity: 8,
        }
    }
}

impl QueueConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    pub fn relay_capacity(mut self, capacity: usize) -> Self {
        self.relay_capacity = capacity;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Rejects values the worker cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidConfiguration`] if any field is zero.
    pub fn validate(&self) -> Result<(), QueueError> {
        if self.poll_interval_ms == 0 {
            return Err(QueueError::InvalidConfiguration(
                "Poll interval must be greater than 0".to_string(),
            ));
        }
        if self.read_buffer_size == 0 {
            return Err(QueueError::InvalidConfiguration(
                "Read buffer size must be greater than 0".to_string(),
            ));
        }
        // tokio's mpsc panics on a zero capacity
        if self.relay_capacity == 0 {
            return Err(QueueError::InvalidConfiguration(
                "Relay capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
