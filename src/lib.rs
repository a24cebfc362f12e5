//! `cpi-lens` library crate.
//!
//! The binary (`cpi`) is a thin wrapper around this library so that:
//!
//! - the pricing pipeline is testable without spawning processes
//! - loaders and presenters are reusable outside the CLI/TUI

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod pricing;
pub mod report;
pub mod tui;
