//! Infrastructure layer: configuration, logging and wiring.

pub mod config;
pub mod logging;
pub mod setup;
