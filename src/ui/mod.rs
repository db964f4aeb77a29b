//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! All command output goes through this module so quiet mode is honored in
//! one place. Diagnostics go through `tracing` instead.

pub mod output;
