//! # stq
//!
//! A local task-queue execution core. Clients create named queues, enqueue
//! commands with a priority, and each queue runs its commands one at a time,
//! most urgent first, capturing output and exit status.
//!
//! ## Features
//!
//! - **Priority Scheduling**: five priority levels, first-come first-served within a level
//! - **Independent Queues**: every running queue drives its own tokio worker
//! - **Process Tree Control**: stopping a queue kills the whole child process group/tree
//! - **Live Output**: read the newest captured stdout/stderr chunk of the running task
//! - **Serialization**: Optional serde support for records, errors and config
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stq::tasks::{
//!     config::QueueConfig,
//!     control::QueueControl,
//!     record::{TaskPriority, TaskRecord},
//!     registry::QueueRegistry,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = QueueRegistry::init(QueueConfig::default())?;
//!     registry.create_queue("q1")?;
//!     let queue = registry.get_queue("q1")?;
//!
//!     #[cfg(unix)]
//!     let (hi, lo) = (
//!         TaskRecord::new("echo").args(["hi"]),
//!         TaskRecord::new("echo").args(["lo"]),
//!     );
//!     #[cfg(windows)]
//!     let (hi, lo) = (
//!         TaskRecord::new("cmd").args(["/C", "echo", "hi"]),
//!         TaskRecord::new("cmd").args(["/C", "echo", "lo"]),
//!     );
//!
//!     queue.add_task(hi)?;
//!     queue.add_task(lo.priority(TaskPriority::Highest))?;
//!     queue.start()?;
//!     queue.wait_until_stopped().await;
//!
//!     // Completion order: the Highest task ran first
//!     assert_eq!(queue.list_finished()?, vec![1, 0]);
//!
//!     registry.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Optional Features
//!
//! - `serde`: Enable serialization support for public data types
//! - `tracing`: Enable structured logging integration (on by default)

pub mod helper;
pub mod tasks;
