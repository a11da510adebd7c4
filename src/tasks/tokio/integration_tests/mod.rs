
mod registry;
mod scheduling;
