//! careplan-generate
//!
//! Generation API invocation, prompt construction, and defensive parsing of
//! the semi-structured text the model returns.

pub mod client;
pub mod error;
pub mod parse;
pub mod prompts;
pub mod repair;
pub mod transaction;
