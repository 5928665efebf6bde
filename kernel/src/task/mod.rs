//! Per-task execution state shared with the trap path.

pub mod process_context;

pub use process_context::TrapFrame;
