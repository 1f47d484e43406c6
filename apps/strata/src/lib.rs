//! # Strata Library
//!
//! This library exposes the Strata CLI commands for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod cli;

// Re-export strata_core for convenience
pub use strata_core;
