//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache sweep: removes expired entries from both storage scopes

mod cleanup;

pub use cleanup::SweepTask;
