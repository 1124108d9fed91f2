//! careplan-export
//!
//! CSV and plain-text renderings of a care plan (施設サービス計画書 第2表).

pub mod csv;
pub mod error;
pub mod render;
