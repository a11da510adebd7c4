pub mod control;
pub mod queue;

pub(crate) mod context;
pub(crate) mod event;
pub(crate) mod process;
pub(crate) mod pump;
pub(crate) mod worker;

#[cfg(test)]
mod integration_tests;
