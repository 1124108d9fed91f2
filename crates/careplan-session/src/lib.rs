//! careplan-session
//!
//! In-memory state of one drafting session: the per-category assessment,
//! generated suggestions, the editable plan rows, and the commands that move
//! data between them.

pub mod assessment;
pub mod error;
pub mod plan_items;
pub mod session;
