use std::fmt::Debug;

use tokio::process::Command;

use crate::tasks::process::error::ProcessControlError;

/// Capability to control a spawned child as a whole process tree.
///
/// The task queue only talks to this trait, so platform differences stay
/// behind [`SystemProcessController`].
pub trait ProcessController: Send + Sync + Debug {
    /// Prepares a command before it is spawned.
    ///
    /// The default does nothing.
    fn configure(&self, command: &mut Command) {
        let _ = command;
    }

    /// Marks a freshly spawned process so its descendants can later be
    /// killed together with it.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessControlError::TagFailed`] if the process could not be
    /// made the root of its own group.
    fn tag_child(&self, pid: u32) -> Result<(), ProcessControlError>;

    /// Forcefully terminates `pid`, and with `whole_group` every process in
    /// its group or descendant tree.
    ///
    /// A process that is already gone counts as terminated.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessControlError::KillFailed`] or
    /// [`ProcessControlError::InvalidPid`]. Termination is best effort.
    fn kill_tree(&self, pid: u32, whole_group: bool) -> Result<(), ProcessControlError>;
}

/// Process controller for the platform this crate was built for.
///
/// # Platform Support
/// - **Unix**: children lead their own process group (`setpgid`); the group is
///   killed with `SIGKILL` via `killpg()`
/// - **Windows**: the descendant tree is discovered at kill time from a
///   ToolHelp snapshot and terminated children-first
/// - **Other platforms**: every operation fails with `Unsupported`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessController;

impl SystemProcessController {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessController for SystemProcessController {
    fn configure(&self, command: &mut Command) {
        #[cfg(unix)]
        crate::tasks::process::posix::configure_group_leader(command);
        #[cfg(not(unix))]
        let _ = command;
    }

    fn tag_child(&self, pid: u32) -> Result<(), ProcessControlError> {
        #[cfg(unix)]
        {
            crate::tasks::process::posix::tag_child(pid)
        }
        #[cfg(windows)]
        {
            // The tree is walked at kill time; nothing to record now.
            let _ = pid;
            Ok(())
        }
        #[cfg(not(any(unix, windows)))]
        {
            let _ = pid;
            Err(ProcessControlError::Unsupported(
                "Process groups are not available on this platform".to_string(),
            ))
        }
    }

    fn kill_tree(&self, pid: u32, whole_group: bool) -> Result<(), ProcessControlError> {
        #[cfg(unix)]
        {
            crate::tasks::process::posix::kill_tree(pid, whole_group)
        }
        #[cfg(windows)]
        {
            crate::tasks::process::win32::kill_tree(pid, whole_group)
        }
        #[cfg(not(any(unix, windows)))]
        {
            let _ = (pid, whole_group);
            Err(ProcessControlError::Unsupported(
                "Process termination is not available on this platform".to_string(),
            ))
        }
    }
}
