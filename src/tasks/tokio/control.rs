use std::sync::Arc;

use crate::{
    helper::tracing::MaybeInstrument,
    tasks::{
        control::{QueueControl, QueueStatusInfo},
        error::QueueError,
        state::QueueState,
        tokio::{queue::TaskQueue, worker::QueueWorker},
    },
};

impl QueueControl for TaskQueue {
    fn start(&self) -> Result<(), QueueError> {
        if !self.ctx.try_begin_run() {
            let msg = "Queue is already running";
            #[cfg(feature = "tracing")]
            tracing::warn!(queue = %self.name(), msg);
            return Err(QueueError::InvalidState(msg.to_string()));
        }
        self.ctx.relay.clear();

        let worker = QueueWorker::new(Arc::clone(&self.ctx), Arc::clone(&self.controller));
        self.runtime
            .spawn(worker.run().in_queue_span("queue_worker", &self.name()));
        Ok(())
    }

    fn stop(&self) -> Result<(), QueueError> {
        let pid = match self.ctx.get_process_id() {
            Some(pid) if self.ctx.is_running() => pid,
            _ => {
                let msg = "Queue is already stopped";
                #[cfg(feature = "tracing")]
                tracing::warn!(queue = %self.name(), msg);
                return Err(QueueError::InvalidState(msg.to_string()));
            }
        };

        self.ctx.request_stop();
        #[allow(clippy::used_underscore_binding)]
        if let Err(_e) = self.controller.kill_tree(pid, true) {
            // The pump retries the kill until the child is reaped
            #[cfg(feature = "tracing")]
            tracing::warn!(queue = %self.name(), pid, error = %_e, "Failed to kill process tree");
        }
        Ok(())
    }
}

impl TaskQueue {
    /// Forces the queue towards Idle regardless of its state.
    ///
    /// Pending tasks are discarded so the worker cannot pick up another one,
    /// and the stop flag is raised even when no child is alive.
    pub(crate) fn halt(&self) {
        self.ctx.pending().clear();
        if !self.ctx.is_running() {
            return;
        }
        self.ctx.request_stop();
        if let Some(pid) = self.ctx.get_process_id() {
            #[allow(clippy::used_underscore_binding)]
            if let Err(_e) = self.controller.kill_tree(pid, true) {
                #[cfg(feature = "tracing")]
                tracing::warn!(queue = %self.name(), pid, error = %_e, "Failed to kill process tree");
            }
        }
    }
}

impl QueueStatusInfo for TaskQueue {
    fn get_name(&self) -> String {
        self.name()
    }

    fn get_state(&self) -> QueueState {
        match (self.ctx.is_running(), self.ctx.is_stop_requested()) {
            (false, _) => QueueState::Idle,
            (true, false) => QueueState::Running,
            (true, true) => QueueState::Stopping,
        }
    }

    fn get_process_id(&self) -> Option<u32> {
        self.ctx.get_process_id()
    }

    fn get_pending_count(&self) -> usize {
        self.ctx.pending().len()
    }

    fn get_finished_count(&self) -> usize {
        self.ctx.finished().len()
    }

    fn get_current_task_id(&self) -> Option<u32> {
        self.ctx.current().as_ref().map(|r| r.id)
    }
}
