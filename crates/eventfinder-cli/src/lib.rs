//! Eventfinder command-line library.
//!
//! Subcommand handlers, logging initialisation and output formatting for the
//! `eventfinder` binary. All behaviour lives in `eventfinder-lib`; this crate
//! only wires configuration, services and rendering together.

pub mod commands;
pub mod logging;
pub mod output;
pub mod terminal;
