//! Background Tasks Module
//!
//! Periodic maintenance for shared cache stores.

pub mod cleanup;

pub use cleanup::spawn_cleanup_task;
