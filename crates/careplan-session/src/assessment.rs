//! Per-category assessment input and generated suggestions.

use std::collections::HashMap;

use tracing::{debug, warn};

use careplan_core::catalog::{self, Category, DEFAULT_CATEGORY_ID};
use careplan_core::models::assessment::{CategoryAssessment, CategoryStatus};
use careplan_core::models::plan::GeneratedPlan;
use careplan_generate::prompts::IntegratedCategory;

use crate::error::SessionError;

/// Assessment data for the categories of one new assessment.
///
/// A category has an entry in the assessment map only while it has a checked
/// item or detail text. Generated plans are held separately, at most one per
/// category.
#[derive(Debug, Clone)]
pub struct AssessmentState {
    active: &'static Category,
    assessments: HashMap<&'static str, CategoryAssessment>,
    generated: HashMap<&'static str, GeneratedPlan>,
}

impl Default for AssessmentState {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessmentState {
    pub fn new() -> Self {
        let active = catalog::get_category(DEFAULT_CATEGORY_ID)
            .unwrap_or(&catalog::all_categories()[0]);
        Self {
            active,
            assessments: HashMap::new(),
            generated: HashMap::new(),
        }
    }

    pub fn active_category(&self) -> &'static Category {
        self.active
    }

    pub fn assessment(&self, category_id: &str) -> Option<&CategoryAssessment> {
        self.assessments.get(category_id)
    }

    /// Replace the recorded input for a category.
    ///
    /// Checked items are reordered to catalog order and de-duplicated; items
    /// that do not belong to the category are dropped. When nothing remains
    /// and `detail_text` is empty the record is removed.
    pub fn record_category_input(
        &mut self,
        category_id: &str,
        checked_items: &[String],
        detail_text: &str,
    ) -> Result<(), SessionError> {
        let category = catalog::require_category(category_id)?;

        let mut indices: Vec<usize> = Vec::with_capacity(checked_items.len());
        for item in checked_items {
            match category.item_index(item) {
                Some(i) => indices.push(i),
                None => warn!(category_id, item = %item, "ignoring item not in category"),
            }
        }
        indices.sort_unstable();
        indices.dedup();

        let input = CategoryAssessment {
            checked_items: indices
                .into_iter()
                .map(|i| category.items[i].to_string())
                .collect(),
            detail_text: detail_text.to_string(),
        };

        if input.is_empty() {
            self.assessments.remove(category.id);
        } else {
            debug!(
                category_id,
                checked = input.checked_items.len(),
                "category input recorded"
            );
            self.assessments.insert(category.id, input);
        }
        Ok(())
    }

    /// Move focus to another category, first committing `pending_input` for
    /// the category losing focus.
    pub fn switch_active_category(
        &mut self,
        category_id: &str,
        pending_input: Option<&CategoryAssessment>,
    ) -> Result<(), SessionError> {
        let next = catalog::require_category(category_id)?;
        if let Some(input) = pending_input {
            self.record_category_input(self.active.id, &input.checked_items, &input.detail_text)?;
        }
        self.active = next;
        Ok(())
    }

    pub fn category_status(&self, category_id: &str) -> CategoryStatus {
        if self.generated.contains_key(category_id) {
            CategoryStatus::Generated
        } else if self
            .assessments
            .get(category_id)
            .is_some_and(|a| !a.is_empty())
        {
            CategoryStatus::HasData
        } else {
            CategoryStatus::Empty
        }
    }

    pub fn checked_category_count(&self) -> usize {
        self.assessments
            .values()
            .filter(|a| a.has_checked_items())
            .count()
    }

    /// Categories with at least one checked item, in catalog order.
    pub fn checked_categories(&self) -> Vec<IntegratedCategory> {
        catalog::all_categories()
            .iter()
            .filter_map(|category| {
                let input = self.assessments.get(category.id)?;
                input.has_checked_items().then(|| IntegratedCategory {
                    id: category.id.to_string(),
                    name: category.name.to_string(),
                    checked_items: input.checked_items.clone(),
                    detail_text: input.detail_text.clone(),
                })
            })
            .collect()
    }

    pub fn generated_plan(&self, category_id: &str) -> Option<&GeneratedPlan> {
        self.generated.get(category_id)
    }

    /// Generated plans paired with their category, in catalog order.
    pub fn generated_plans(&self) -> Vec<(&'static Category, &GeneratedPlan)> {
        catalog::all_categories()
            .iter()
            .filter_map(|c| self.generated.get(c.id).map(|plan| (c, plan)))
            .collect()
    }

    pub fn generated_count(&self) -> usize {
        self.generated.len()
    }

    /// Store (or overwrite) the generated plan for a category.
    pub fn set_generated_plan(&mut self, category_id: &str, plan: GeneratedPlan) -> Result<(), SessionError> {
        let category = catalog::require_category(category_id)?;
        self.generated.insert(category.id, plan);
        Ok(())
    }

    /// Remove a category's generated plan. Returns whether one existed.
    pub fn delete_generated_plan(&mut self, category_id: &str) -> bool {
        self.generated.remove(category_id).is_some()
    }

    /// Whether leaving now would discard recorded input or suggestions.
    pub fn has_unsaved_input(&self) -> bool {
        !self.assessments.is_empty() || !self.generated.is_empty()
    }
}
