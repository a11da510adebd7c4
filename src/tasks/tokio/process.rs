use std::process::Stdio;

use tokio::process::{Child, Command};

use crate::tasks::{error::QueueError, record::TaskRecord, tokio::worker::QueueWorker};

impl QueueWorker {
    /// Builds the command for `record`: stdout and stderr piped, stdin closed.
    ///
    /// The working directory is only applied when the record names one.
    pub(crate) fn setup_command(&self, record: &TaskRecord) -> Command {
        let mut cmd = Command::new(&record.exec_name);
        cmd.args(&record.args);

        if !record.work_dir.is_empty() {
            cmd.current_dir(&record.work_dir);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        self.controller.configure(&mut cmd);
        cmd
    }

    pub(crate) fn spawn_child(&self, mut cmd: Command) -> Result<(Child, u32), QueueError> {
        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::error!(error = %e, "Failed to spawn child process");

                return Err(QueueError::Internal(format!(
                    "Failed to spawn child process: {}",
                    e
                )));
            }
        };

        let Some(pid) = child.id() else {
            let msg = "Failed to get process id";

            #[cfg(feature = "tracing")]
            tracing::error!(msg);

            return Err(QueueError::Internal(msg.to_string()));
        };
        Ok((child, pid))
    }
}
