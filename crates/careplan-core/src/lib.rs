//! careplan-core
//!
//! Pure domain types, the assessment category catalog, and storage key
//! conventions. No I/O; this is the shared vocabulary of the care-plan
//! toolkit.

pub mod catalog;
pub mod error;
pub mod models;
pub mod store_keys;
