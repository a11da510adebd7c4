use std::sync::Arc;

use tokio::runtime::Handle;

use crate::tasks::{
    config::QueueConfig, error::QueueError, process::control::ProcessController,
    record::TaskRecord, tokio::context::QueueContext,
};

/// A named queue of tasks executed one at a time, most urgent first.
///
/// Tasks are added while the queue is idle or running. [`start`] launches a
/// worker loop on the queue's tokio runtime that drains the pending set; the
/// worker ends on its own once nothing is left, or after [`stop`].
///
/// Every query returns an independent copy; nothing handed out aliases the
/// queue's own records.
///
/// [`start`]: crate::tasks::control::QueueControl::start
/// [`stop`]: crate::tasks::control::QueueControl::stop
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use stq::tasks::{
///     config::QueueConfig,
///     control::QueueControl,
///     process::SystemProcessController,
///     record::{TaskPriority, TaskRecord},
///     tokio::queue::TaskQueue,
/// };
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let queue = TaskQueue::new(
///         "builds",
///         QueueConfig::default(),
///         tokio::runtime::Handle::current(),
///         Arc::new(SystemProcessController::new()),
///     )?;
///
///     #[cfg(unix)]
///     let record = TaskRecord::new("echo").args(["hi"]);
///     #[cfg(windows)]
///     let record = TaskRecord::new("cmd").args(["/C", "echo", "hi"]);
///
///     let id = queue.add_task(record.priority(TaskPriority::Highest))?;
///     queue.start()?;
///     queue.wait_until_stopped().await;
///
///     assert!(queue.finished_details(id)?.succeeded);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct TaskQueue {
    pub(crate) ctx: Arc<QueueContext>,
    pub(crate) controller: Arc<dyn ProcessController>,
    pub(crate) runtime: Handle,
}

impl TaskQueue {
    /// Creates an idle queue whose worker will run on `runtime`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidConfiguration`] if `config` does not validate.
    pub fn new(
        name: impl Into<String>,
        config: QueueConfig,
        runtime: Handle,
        controller: Arc<dyn ProcessController>,
    ) -> Result<Self, QueueError> {
        config.validate()?;
        Ok(Self {
            ctx: Arc::new(QueueContext::new(name, config)),
            controller,
            runtime,
        })
    }

    pub fn name(&self) -> String {
        self.ctx.name()
    }
    pub(crate) fn set_name(&self, name: impl Into<String>) {
        self.ctx.set_name(name);
    }

    /// Enqueues `record` and returns the id assigned to it.
    ///
    /// Any id, exit code or success flag already on the record is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Internal`] once this queue has handed out every
    /// `u32` id.
    pub fn add_task(&self, record: TaskRecord) -> Result<u32, QueueError> {
        let id = self.ctx.pending().push(record)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(queue = %self.name(), task_id = id, "Task added");

        Ok(id)
    }

    /// Removes a task that has not started yet.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::NotFound`] if `id` is not pending; running and
    /// finished tasks cannot be removed.
    pub fn remove_task(&self, id: u32) -> Result<(), QueueError> {
        match self.ctx.pending().remove(id) {
            Some(_) => Ok(()),
            None => Err(QueueError::NotFound(format!("Task {} is not pending", id))),
        }
    }

    /// Pending ids in the order they will run.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Empty`] if nothing is pending.
    pub fn list_pending(&self) -> Result<Vec<u32>, QueueError> {
        let ids = self.ctx.pending().ids();
        if ids.is_empty() {
            return Err(QueueError::Empty("Pending list is empty".to_string()));
        }
        Ok(ids)
    }

    /// Finished ids in completion order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Empty`] if nothing has finished.
    pub fn list_finished(&self) -> Result<Vec<u32>, QueueError> {
        let ids: Vec<u32> = self.ctx.finished().iter().map(|r| r.id).collect();
        if ids.is_empty() {
            return Err(QueueError::Empty("Finished list is empty".to_string()));
        }
        Ok(ids)
    }

    /// # Errors
    ///
    /// Returns [`QueueError::NotFound`] if `id` is not pending.
    pub fn pending_details(&self, id: u32) -> Result<TaskRecord, QueueError> {
        self.ctx
            .pending()
            .get(id)
            .cloned()
            .ok_or_else(|| QueueError::NotFound(format!("Task {} is not pending", id)))
    }

    /// # Errors
    ///
    /// Returns [`QueueError::NotFound`] if `id` has not finished.
    pub fn finished_details(&self, id: u32) -> Result<TaskRecord, QueueError> {
        self.ctx
            .finished()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| QueueError::NotFound(format!("Task {} is not finished", id)))
    }

    /// The task the worker is executing right now.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidState`] if the queue is not running and
    /// [`QueueError::NotFound`] if the worker is between tasks.
    pub fn current_task(&self) -> Result<TaskRecord, QueueError> {
        if !self.ctx.is_running() {
            return Err(QueueError::InvalidState("Queue is not running".to_string()));
        }
        self.ctx
            .current()
            .clone()
            .ok_or_else(|| QueueError::NotFound("No task is currently running".to_string()))
    }

    pub fn clear_pending(&self) {
        self.ctx.pending().clear();
    }

    pub fn clear_finished(&self) {
        self.ctx.finished().clear();
    }

    /// Takes the newest unread output chunk of the running task.
    ///
    /// Returns an empty string when nothing new arrived since the last read.
    /// Only the most recent chunk is kept; older unread chunks are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidState`] if the queue is not running.
    pub fn read_current_output(&self) -> Result<String, QueueError> {
        if !self.ctx.is_running() {
            return Err(QueueError::InvalidState("Queue is not running".to_string()));
        }
        Ok(self.ctx.relay.take())
    }

    /// Resolves once the worker loop has finished its cleanup.
    ///
    /// Resolves immediately on an idle queue.
    pub async fn wait_until_stopped(&self) {
        self.ctx.wait_until_stopped().await;
    }
}
