use std::collections::{HashMap, HashSet};

use windows::Win32::{
    Foundation::{CloseHandle, ERROR_INVALID_PARAMETER},
    System::{
        Diagnostics::ToolHelp::{
            CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW,
            TH32CS_SNAPPROCESS,
        },
        Threading::{OpenProcess, PROCESS_TERMINATE, TerminateProcess},
    },
};

use crate::tasks::process::error::ProcessControlError;

/// Builds a parent id -> child ids map from one system process snapshot.
fn snapshot_children(pid: u32) -> Result<HashMap<u32, Vec<u32>>, ProcessControlError> {
    let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
    unsafe {
        let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0).map_err(|e| {
            ProcessControlError::KillFailed {
                pid,
                reason: format!("Failed to snapshot process list: {}", e),
            }
        })?;

        let mut entry = PROCESSENTRY32W {
            dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
            ..Default::default()
        };
        if Process32FirstW(snapshot, &mut entry).is_ok() {
            loop {
                children
                    .entry(entry.th32ParentProcessID)
                    .or_default()
                    .push(entry.th32ProcessID);
                if Process32NextW(snapshot, &mut entry).is_err() {
                    break;
                }
            }
        }
        let _ = CloseHandle(snapshot);
    }
    Ok(children)
}

fn terminate(pid: u32) -> Result<(), ProcessControlError> {
    unsafe {
        let handle = match OpenProcess(PROCESS_TERMINATE, false, pid) {
            Ok(handle) => handle,
            // No such process: already terminated
            Err(e) if e.code() == ERROR_INVALID_PARAMETER.to_hresult() => return Ok(()),
            Err(e) => {
                return Err(ProcessControlError::KillFailed {
                    pid,
                    reason: format!("Failed to open process: {}", e),
                });
            }
        };
        let result = TerminateProcess(handle, 1);
        let _ = CloseHandle(handle);
        result.map_err(|e| ProcessControlError::KillFailed {
            pid,
            reason: format!("Failed to terminate process: {}", e),
        })
    }
}

/// Terminates every descendant of `pid` before `pid` itself.
fn terminate_tree(
    pid: u32,
    children: &HashMap<u32, Vec<u32>>,
    visited: &mut HashSet<u32>,
) -> Result<(), ProcessControlError> {
    // Recycled pids can make parent links cyclic
    if !visited.insert(pid) {
        return Ok(());
    }
    if let Some(kids) = children.get(&pid) {
        for &child in kids {
            #[allow(clippy::used_underscore_binding)]
            if let Err(_e) = terminate_tree(child, children, visited) {
                #[cfg(feature = "tracing")]
                tracing::warn!(pid = child, error = %_e, "Failed to terminate descendant process");
            }
        }
    }
    terminate(pid)
}

pub(crate) fn kill_tree(pid: u32, whole_group: bool) -> Result<(), ProcessControlError> {
    if pid == 0 {
        return Err(ProcessControlError::InvalidPid(pid));
    }
    if !whole_group {
        return terminate(pid);
    }
    let children = snapshot_children(pid)?;
    terminate_tree(pid, &children, &mut HashSet::new())
}
