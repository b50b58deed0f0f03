//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Sweep: Removes cache entries past the staleness bound at configured intervals

mod cleanup;

pub use cleanup::spawn_sweep_task;
