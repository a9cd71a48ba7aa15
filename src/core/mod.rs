//! Core library modules for motomap
//!
//! Graph model, the four pipeline stages and the plumbing they share.

pub mod cleaner;
pub mod config;
pub mod defaults;
pub mod elevation;
pub mod error;
pub mod grade;
pub mod graph;
pub mod http;
pub mod loader;
pub mod pipeline;
