use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Assessment input recorded for one category.
///
/// `checked_items` is kept in catalog order with no duplicates. A record with
/// no checked items and empty detail text is never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryAssessment {
    pub checked_items: Vec<String>,
    #[serde(default)]
    pub detail_text: String,
}

impl CategoryAssessment {
    pub fn is_empty(&self) -> bool {
        self.checked_items.is_empty() && self.detail_text.is_empty()
    }

    pub fn has_checked_items(&self) -> bool {
        !self.checked_items.is_empty()
    }
}

/// Display affordance for a category tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum CategoryStatus {
    /// Nothing recorded and nothing generated.
    Empty,
    /// Input recorded, no plan generated yet.
    HasData,
    /// A generated plan exists. Takes precedence over `HasData`.
    Generated,
}

impl CategoryStatus {
    /// Marker shown next to the category name.
    pub fn marker(self) -> &'static str {
        match self {
            CategoryStatus::Empty => "",
            CategoryStatus::HasData => "●",
            CategoryStatus::Generated => "✓",
        }
    }
}
