//! Key-value store key conventions.
//!
//! Pure string functions. These define the canonical names of the documents
//! kept in the local care-plan store.

use uuid::Uuid;

/// Ordered, append-only registry of every registered patient.
pub const PATIENTS: &str = "patients";

/// The caller-supplied credential for the generation API.
pub const API_KEY: &str = "gemini_api_key";

/// The saved care-plan item list for one patient.
pub fn care_plan(patient_id: Uuid) -> String {
    format!("careplan_{patient_id}")
}
