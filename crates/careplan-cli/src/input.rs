//! Translation of command-line input into assessment data.

use std::collections::BTreeMap;
use std::path::Path;

use careplan_core::catalog::Category;
use careplan_core::models::assessment::CategoryAssessment;

/// Map `--item` values to catalog item text.
///
/// A value that is a 1-based number within the category's item list selects
/// that item; anything else is taken as the item text itself.
pub fn resolve_items(category: &Category, raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|value| {
            value
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| category.items.get(i))
                .map_or_else(|| value.trim().to_string(), |item| item.to_string())
        })
        .collect()
}

/// Read an assessment file: a JSON object keyed by category id, e.g.
///
/// ```json
/// { "meal": { "checkedItems": ["むせ込みがある"], "detailText": "" } }
/// ```
pub fn load_assessment_file(path: &Path) -> eyre::Result<BTreeMap<String, CategoryAssessment>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read assessment file {}: {e}", path.display()))?;
    let parsed = serde_json::from_str(&contents)
        .map_err(|e| eyre::eyre!("invalid assessment file {}: {e}", path.display()))?;
    Ok(parsed)
}
