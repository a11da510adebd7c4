use nix::{
    errno::Errno,
    sys::signal::{Signal, kill, killpg},
    unistd::{Pid, getpgid, setpgid},
};
use tokio::process::Command;

use crate::tasks::process::error::ProcessControlError;

/// Makes the spawned child the leader of a new process group before `exec`,
/// so the group exists before the child can fork anything.
pub(crate) fn configure_group_leader(command: &mut Command) {
    // SAFETY: the hook only calls setpgid, which is async-signal-safe.
    unsafe {
        command.pre_exec(|| {
            setpgid(Pid::from_raw(0), Pid::from_raw(0))
                .map_err(|e| std::io::Error::from_raw_os_error(e as i32))
        });
    }
}

fn to_pid(pid: u32) -> Result<Pid, ProcessControlError> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Ok(Pid::from_raw(raw)),
        _ => Err(ProcessControlError::InvalidPid(pid)),
    }
}

pub(crate) fn tag_child(pid: u32) -> Result<(), ProcessControlError> {
    let target = to_pid(pid)?;
    if matches!(getpgid(Some(target)), Ok(pgid) if pgid == target) {
        return Ok(());
    }
    setpgid(target, target).map_err(|e| ProcessControlError::TagFailed {
        pid,
        reason: e.to_string(),
    })
}

pub(crate) fn kill_tree(pid: u32, whole_group: bool) -> Result<(), ProcessControlError> {
    let target = to_pid(pid)?;
    let result = if whole_group {
        match killpg(target, Signal::SIGKILL) {
            // No such group: the child never became a leader, kill it alone
            Err(Errno::ESRCH) => kill(target, Signal::SIGKILL),
            other => other,
        }
    } else {
        kill(target, Signal::SIGKILL)
    };

    match result {
        Ok(()) | Err(Errno::ESRCH) => Ok(()), // Already terminated
        Err(e) => Err(ProcessControlError::KillFailed {
            pid,
            reason: e.to_string(),
        }),
    }
}
