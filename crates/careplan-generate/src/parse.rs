//! Conversion of raw model output into plan records.
//!
//! Parsing never fails. Output that cannot be recovered degrades to fixed
//! fallback records so the user always gets an editable row set.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use careplan_core::models::plan::{GeneratedPlan, PlanField};

use crate::prompts::IntegratedCategory;
use crate::repair;

/// Value of a field the model did not produce.
pub const GENERATION_FAILED: &str = "（生成失敗）";

/// Category name for an integrated record that did not name its category.
pub const UNKNOWN_CATEGORY: &str = "不明";

const INTEGRATED_CATEGORY_KEY: &str = "categoryName";

/// The record used when a response has no usable JSON, and for categories an
/// integrated response did not cover.
pub fn fallback_plan(category_name: &str) -> GeneratedPlan {
    GeneratedPlan {
        category_name: category_name.to_string(),
        needs: "適切なケアを受けて安心して生活したい".to_string(),
        long_term_goal: "健康状態を維持し安心して過ごせる".to_string(),
        short_term_goal: "必要なケアを受けられる".to_string(),
        service_content: "状態観察、声かけ、介助".to_string(),
    }
}

/// Parse a single-category response.
///
/// The category name always comes from the caller, never from the payload.
/// Each field is read from its JSON key, then from its localized label; a
/// field missing from both is set to [`GENERATION_FAILED`].
pub fn parse_category_response(text: &str, category_name: &str) -> GeneratedPlan {
    if text.trim().is_empty() {
        warn!(category_name, "empty generation response, using fallback");
        return fallback_plan(category_name);
    }

    let cleaned = repair::strip_code_fences(text);
    let Some(object) = repair::extract_object(&cleaned) else {
        warn!(category_name, "no JSON object recovered, using fallback");
        debug!(cleaned = %cleaned, "unparseable generation response");
        return fallback_plan(category_name);
    };

    let field = |f: PlanField| {
        field_text(&object, f.key())
            .or_else(|| field_text(&object, f.label()))
            .unwrap_or_else(|| GENERATION_FAILED.to_string())
    };

    GeneratedPlan {
        category_name: category_name.to_string(),
        needs: field(PlanField::Needs),
        long_term_goal: field(PlanField::LongTermGoal),
        short_term_goal: field(PlanField::ShortTermGoal),
        service_content: field(PlanField::ServiceContent),
    }
}

/// Parse an integrated response into exactly one record per input category.
///
/// Missing fields become empty strings and a missing category name becomes
/// [`UNKNOWN_CATEGORY`]. When no array can be recovered every category gets
/// its [`fallback_plan`]. Extra records are dropped; categories the array did
/// not reach are filled with their fallback.
pub fn parse_integrated_response(text: &str, categories: &[IntegratedCategory]) -> Vec<GeneratedPlan> {
    let cleaned = repair::strip_code_fences(text);

    let Some(elements) = repair::extract_array(&cleaned) else {
        warn!(
            categories = categories.len(),
            "no JSON array recovered, using fallback records"
        );
        return categories
            .iter()
            .map(|c| fallback_plan(&c.name))
            .collect();
    };

    if elements.len() != categories.len() {
        warn!(
            expected = categories.len(),
            received = elements.len(),
            "integrated response record count mismatch"
        );
    }

    let mut records: Vec<GeneratedPlan> = elements
        .iter()
        .take(categories.len())
        .map(normalize_integrated_record)
        .collect();

    for category in categories.iter().skip(records.len()) {
        records.push(fallback_plan(&category.name));
    }

    records
}

fn normalize_integrated_record(element: &Value) -> GeneratedPlan {
    let empty = Map::new();
    let object = element.as_object().unwrap_or(&empty);
    let field = |key: &str| field_text(object, key).unwrap_or_default();

    GeneratedPlan {
        category_name: field_text(object, INTEGRATED_CATEGORY_KEY)
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
        needs: field(PlanField::Needs.key()),
        long_term_goal: field(PlanField::LongTermGoal.key()),
        short_term_goal: field(PlanField::ShortTermGoal.key()),
        service_content: field(PlanField::ServiceContent.key()),
    }
}

/// Text of a member, treating absent, `null`, `false` and `""` as missing.
fn field_text(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Trim a refinement response down to the replacement text.
///
/// Returns `None` when the model produced nothing usable.
pub fn parse_refinement_response(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
