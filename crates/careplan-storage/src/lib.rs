//! careplan-storage
//!
//! Local key-value persistence. Each key is one JSON document in a data
//! directory; every write replaces the whole document.

pub mod client;
pub mod error;
pub mod objects;
pub mod records;
pub mod state;
