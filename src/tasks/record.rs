use std::fmt;

use crate::tasks::error::QueueError;

/// Scheduling priority of a task.
///
/// Lower [`rank`](TaskPriority::rank) runs first: `Highest` (0) is dequeued
/// before `Lowest` (4).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskPriority {
    Highest = 0,
    AboveNormal = 1,
    #[default]
    Normal = 2,
    BelowNormal = 3,
    Lowest = 4,
}

impl TaskPriority {
    /// Numeric ordinal used by the scheduler (lower = more urgent).
    pub fn rank(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for TaskPriority {
    type Error = QueueError;

    fn try_from(rank: u8) -> Result<Self, Self::Error> {
        match rank {
            0 => Ok(TaskPriority::Highest),
            1 => Ok(TaskPriority::AboveNormal),
            2 => Ok(TaskPriority::Normal),
            3 => Ok(TaskPriority::BelowNormal),
            4 => Ok(TaskPriority::Lowest),
            n => Err(QueueError::InvalidInput(format!(
                "Priority rank {} is out of range 0..=4",
                n
            ))),
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskPriority::Highest => "highest",
            TaskPriority::AboveNormal => "above_normal",
            TaskPriority::Normal => "normal",
            TaskPriority::BelowNormal => "below_normal",
            TaskPriority::Lowest => "lowest",
        };
        f.write_str(name)
    }
}

/// One unit of work and, once it has run, its outcome.
///
/// A record handed to [`TaskQueue::add_task`](crate::tasks::tokio::queue::TaskQueue::add_task)
/// gets its `id` assigned by the queue. Every record returned by a queue is an
/// owned copy, so mutating it never touches queue state.
///
/// # Examples
///
/// ```rust
/// use stq::tasks::record::{TaskPriority, TaskRecord};
///
/// let record = TaskRecord::new("cargo")
///     .args(["build", "--release"])
///     .work_dir("/tmp")
///     .priority(TaskPriority::Highest);
/// # let _ = record;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskRecord {
    /// Per-queue identifier, assigned on acceptance
    pub id: u32,

    /// Program to execute
    pub exec_name: String,

    /// Arguments passed to the program
    pub args: Vec<String>,

    /// Working directory; empty means the server's current directory
    pub work_dir: String,

    pub priority: TaskPriority,

    /// Exit code of the finished process, `-1` when none was reported
    pub exit_code: i32,

    pub succeeded: bool,
}

impl TaskRecord {
    pub fn new(exec_name: impl Into<String>) -> Self {
        TaskRecord {
            exec_name: exec_name.into(),
            ..Default::default()
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn work_dir(mut self, dir: impl Into<String>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Records the outcome of a child that ran to completion.
    pub(crate) fn set_exit(&mut self, exit_code: Option<i32>) {
        self.exit_code = exit_code.unwrap_or(-1);
        self.succeeded = exit_code == Some(0);
    }

    /// Records a task that never ran or was stopped on request.
    pub(crate) fn set_failed(&mut self, exit_code: Option<i32>) {
        self.exit_code = exit_code.unwrap_or(-1);
        self.succeeded = false;
    }

    /// Prepares a submitted record for the pending heap.
    pub(crate) fn accept(&mut self, id: u32) {
        self.id = id;
        self.exit_code = 0;
        self.succeeded = false;
    }
}
