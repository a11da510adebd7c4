use std::sync::Arc;

use tokio::{
    sync::{mpsc, oneshot},
    time::sleep,
};

use crate::tasks::{
    process::control::ProcessController,
    tokio::{
        context::QueueContext,
        event::{LoopExit, PumpSignal},
        pump::OutputPump,
    },
};

/// Drains a queue's pending set one child process at a time.
///
/// One worker exists per `start()`; it ends when the pending set is empty or
/// a stop was requested, and always leaves the queue Idle.
#[derive(Debug)]
pub(crate) struct QueueWorker {
    pub(crate) ctx: Arc<QueueContext>,
    pub(crate) controller: Arc<dyn ProcessController>,
}

impl QueueWorker {
    pub(crate) fn new(ctx: Arc<QueueContext>, controller: Arc<dyn ProcessController>) -> Self {
        Self { ctx, controller }
    }

    pub(crate) async fn run(self) {
        #[cfg(feature = "tracing")]
        tracing::debug!("Worker loop started");

        loop {
            let exit = self.run_once().await;

            #[cfg(feature = "tracing")]
            tracing::debug!(?exit, "Worker iteration finished");

            if !exit.continues() {
                break;
            }
        }

        self.ctx.finish_run();

        #[cfg(feature = "tracing")]
        tracing::debug!("Worker loop stopped");
    }

    /// Runs the highest-priority pending task to completion.
    pub(crate) async fn run_once(&self) -> LoopExit {
        if self.ctx.is_stop_requested() {
            return LoopExit::StoppedByRequest;
        }
        let Some(record) = self.ctx.pop_pending() else {
            return LoopExit::PendingExhausted;
        };

        #[cfg(feature = "tracing")]
        let task_id = record.id;
        #[cfg(feature = "tracing")]
        tracing::info!(task_id, exec = %record.exec_name, "Running task");

        let cmd = self.setup_command(&record);
        self.ctx.set_current(record);

        let (child, pid) = match self.spawn_child(cmd) {
            Ok(spawned) => spawned,
            #[allow(clippy::used_underscore_binding)]
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(task_id, error = %_e, "Task failed to spawn, skipping");

                self.ctx.update_current(|r| r.set_failed(None));
                self.ctx.retire_current();
                return LoopExit::SpawnFailed;
            }
        };

        #[allow(clippy::used_underscore_binding)]
        if let Err(_e) = self.controller.tag_child(pid) {
            #[cfg(feature = "tracing")]
            tracing::error!(pid, error = %_e, "Failed to tag child process");

            #[allow(clippy::used_underscore_binding)]
            if let Err(_e) = self.controller.kill_tree(pid, false) {
                #[cfg(feature = "tracing")]
                tracing::warn!(pid, error = %_e, "Failed to kill untagged child process");
            }
            // `child` is dropped here; kill_on_drop reaps it
            self.ctx.update_current(|r| r.set_failed(None));
            self.ctx.retire_current();
            return LoopExit::SpawnFailed;
        }
        self.ctx.set_process_id(pid);

        let (chunk_tx, mut chunk_rx) = mpsc::channel(self.ctx.config.relay_capacity);
        let (done_tx, mut done_rx) = oneshot::channel();
        let pump = OutputPump::new(
            Arc::clone(&self.ctx),
            Arc::clone(&self.controller),
            child,
            pid,
            chunk_tx,
        );
        tokio::spawn(pump.run(done_tx));

        let poll = self.ctx.config.poll_interval();
        let signal = loop {
            tokio::select! {
                Some(chunk) = chunk_rx.recv() => {
                    self.ctx.relay.publish(chunk);
                }
                signal = &mut done_rx => {
                    break signal.unwrap_or_else(|_| {
                        #[cfg(feature = "tracing")]
                        tracing::error!(pid, "Output pump ended without a signal");
                        PumpSignal::ChildExited { exit_code: None }
                    });
                }
                _ = sleep(poll) => {}
            }
        };
        while let Ok(chunk) = chunk_rx.try_recv() {
            self.ctx.relay.publish(chunk);
        }
        self.ctx.clear_process_id();

        match signal {
            PumpSignal::ChildExited { exit_code } => {
                #[cfg(feature = "tracing")]
                tracing::info!(pid, ?exit_code, "Task finished");

                self.ctx.update_current(|r| r.set_exit(exit_code));
                if self.ctx.is_stop_requested() {
                    // stop() landed after the exit; retired by finish_run
                    return LoopExit::StoppedByRequest;
                }
                self.ctx.retire_current();
                LoopExit::ChildExited
            }
            PumpSignal::StoppedByRequest { exit_code } => {
                #[cfg(feature = "tracing")]
                tracing::info!(pid, ?exit_code, "Task stopped by request");

                // retired by finish_run
                self.ctx.update_current(|r| r.set_failed(exit_code));
                LoopExit::StoppedByRequest
            }
        }
    }
}
