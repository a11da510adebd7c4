use std::sync::{Mutex, PoisonError};

/// Single-slot, latest-wins mailbox for a running child's output.
///
/// The worker publishes each newly captured chunk; a chunk nobody has read yet
/// is overwritten rather than queued. Readers take the slot, leaving it empty.
#[derive(Debug, Default)]
pub struct OutputRelay {
    slot: Mutex<Option<String>>,
}

impl OutputRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `chunk`, returning `true` if an unread chunk was discarded.
    pub fn publish(&self, chunk: String) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.replace(chunk).is_some()
    }

    /// Takes the latest unread chunk, or an empty string if nothing new arrived.
    pub fn take(&self) -> String {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}

/// Drains `buf` into a string chunk.
///
/// Invalid bytes are replaced, except for an incomplete multi-byte sequence
/// at the very end, which stays in `buf` to be completed by the next read.
/// Returns `None` when there is nothing to forward.
pub(crate) fn drain_utf8(buf: &mut Vec<u8>) -> Option<String> {
    let cut = buf.len() - incomplete_tail_len(buf);
    if cut == 0 {
        return None;
    }
    let tail = buf.split_off(cut);
    let chunk = String::from_utf8_lossy(buf).into_owned();
    *buf = tail;
    Some(chunk)
}

fn incomplete_tail_len(buf: &[u8]) -> usize {
    for back in 1..=buf.len().min(3) {
        let byte = buf[buf.len() - back];
        let width = match byte {
            0x80..=0xBF => continue,
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return 0,
        };
        return if width > back { back } else { 0 };
    }
    0
}
