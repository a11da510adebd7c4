/// Observable running state of a task queue.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// No worker loop is active
    Idle,
    Running,
    /// Running, but a stop has been requested and the worker has not yet exited
    Stopping,
}
