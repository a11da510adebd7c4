/// Why one iteration of the worker loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopExit {
    /// The child exited (or its monitor failed) and the task was retired
    ChildExited,
    /// The child could not be spawned or tagged; the task was retired as failed
    SpawnFailed,
    /// A stop was requested; the loop ends and final cleanup retires the task
    StoppedByRequest,
    /// Nothing left to run
    PendingExhausted,
}

impl LoopExit {
    /// Whether the worker should go on to the next pending task.
    pub(crate) fn continues(self) -> bool {
        matches!(self, LoopExit::ChildExited | LoopExit::SpawnFailed)
    }
}

/// Completion signal sent by the output pump to the worker loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PumpSignal {
    ChildExited { exit_code: Option<i32> },
    StoppedByRequest { exit_code: Option<i32> },
}
