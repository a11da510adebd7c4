pub mod config;
pub mod control;
pub mod error;
pub mod process;
pub mod record;
pub mod registry;
pub mod relay;
pub mod scheduler;
pub mod state;
pub mod tokio;
