//! Tracker Service Library Crate
//!
//! Everything around the progress engine that touches the outside world:
//! configuration, source discovery, the state files and the delivery sinks.
//! The `tracker` binary is a thin wrapper around this library.

pub mod config;
pub mod discovery;
pub mod notify;
pub mod runner;
pub mod store;
