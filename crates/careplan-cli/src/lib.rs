//! careplan-cli library root.
//!
//! Exposes the config and input helpers so integration tests can exercise
//! them without going through the command layer.

pub mod config;
pub mod input;
