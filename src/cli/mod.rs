//! CLI-specific utilities for motomap
//!
//! This module contains code specific to the command-line interface,
//! separate from the core library functionality.

pub mod progress;
pub mod report;

pub use progress::ProgressManager;
pub use report::GraphReport;
