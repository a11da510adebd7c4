use crate::tasks::{error::QueueError, state::QueueState};

/// Starting and stopping a queue's worker loop.
pub trait QueueControl {
    /// Launches the worker loop.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidState`] if the queue is already running.
    fn start(&self) -> Result<(), QueueError>;

    /// Requests that the running task and the worker loop stop.
    ///
    /// Pending tasks are kept. Only a queue with a live child can be stopped.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidState`] if the queue is not running or no
    /// child process is currently alive.
    fn stop(&self) -> Result<(), QueueError>;
}

pub trait QueueStatusInfo {
    fn get_name(&self) -> String;
    fn get_state(&self) -> QueueState;
    fn get_process_id(&self) -> Option<u32>;
    fn get_pending_count(&self) -> usize;
    fn get_finished_count(&self) -> usize;
    fn get_current_task_id(&self) -> Option<u32>;

    fn is_running(&self) -> bool {
        self.get_state() != QueueState::Idle
    }

    /// Point-in-time snapshot; fields are read one after another, not atomically.
    fn get_information(&self) -> QueueInformation {
        QueueInformation {
            name: self.get_name(),
            state: self.get_state(),
            process_id: self.get_process_id(),
            pending_count: self.get_pending_count(),
            finished_count: self.get_finished_count(),
            current_task_id: self.get_current_task_id(),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueInformation {
    pub name: String,
    pub state: QueueState,
    pub process_id: Option<u32>,
    pub pending_count: usize,
    pub finished_count: usize,
    pub current_task_id: Option<u32>,
}
