pub mod control;
pub mod error;

#[cfg(unix)]
mod posix;
#[cfg(windows)]
mod win32;

pub use control::{ProcessController, SystemProcessController};
pub use error::ProcessControlError;
