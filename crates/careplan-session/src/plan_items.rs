//! The ordered, editable rows of a care plan.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use careplan_core::catalog::Category;
use careplan_core::models::plan::{CarePlanItem, GeneratedPlan, PlanField};
use careplan_export::{csv, render};
use careplan_generate::client::TextGenerator;
use careplan_generate::transaction;

use crate::error::SessionError;

/// How generated plans are merged into existing rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    Append,
    Replace,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanItemStore {
    items: Vec<CarePlanItem>,
}

impl PlanItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<CarePlanItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[CarePlanItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&CarePlanItem, SessionError> {
        self.items.get(index).ok_or(SessionError::IndexOutOfRange {
            index,
            len: self.items.len(),
        })
    }

    /// Convert per-category plans into rows tagged with their category.
    ///
    /// With [`MergeMode::Replace`] existing rows are dropped first. Returns
    /// the number of rows added.
    pub fn append_from_generated_plans<'a>(
        &mut self,
        plans: impl IntoIterator<Item = (&'a Category, &'a GeneratedPlan)>,
        mode: MergeMode,
    ) -> usize {
        if mode == MergeMode::Replace {
            self.items.clear();
        }
        let before = self.items.len();
        self.items.extend(plans.into_iter().map(|(category, plan)| {
            CarePlanItem::from_generated(Some(category.id.to_string()), plan.clone())
        }));
        let added = self.items.len() - before;
        info!(?mode, added, total = self.items.len(), "generated plans transferred");
        added
    }

    /// Append integrated-generation records. These rows carry no category id.
    pub fn append_from_integrated_results(&mut self, records: Vec<GeneratedPlan>) -> usize {
        let added = records.len();
        self.items
            .extend(records.into_iter().map(|r| CarePlanItem::from_generated(None, r)));
        info!(added, total = self.items.len(), "integrated results appended");
        added
    }

    /// Overwrite one field of one row.
    pub fn edit_field(&mut self, index: usize, field: PlanField, value: String) -> Result<(), SessionError> {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(SessionError::IndexOutOfRange { index, len })?;
        item.set_field(field, value);
        debug!(index, %field, "plan field edited");
        Ok(())
    }

    /// Ask the generator for a rewrite of one field.
    ///
    /// The store is not modified; the caller decides whether to apply the
    /// proposal with [`PlanItemStore::edit_field`].
    pub fn refine_field(
        &self,
        generator: &dyn TextGenerator,
        api_key: &str,
        index: usize,
        field: PlanField,
        instruction: &str,
    ) -> Result<Option<String>, SessionError> {
        let current = self.get(index)?.field(field);
        Ok(transaction::refine_text(generator, api_key, current, instruction)?)
    }

    pub fn delete_item(&mut self, index: usize) -> Result<CarePlanItem, SessionError> {
        if index >= self.items.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        let removed = self.items.remove(index);
        info!(index, remaining = self.items.len(), "plan item deleted");
        Ok(removed)
    }

    /// CSV rendering with BOM and header row.
    pub fn serialize_for_export(&self) -> String {
        csv::to_csv(&self.items)
    }

    /// Plain-text rendering for the clipboard.
    pub fn serialize_for_clipboard(&self) -> Result<String, SessionError> {
        Ok(render::render_clipboard(&self.items)?)
    }

    pub fn into_items(self) -> Vec<CarePlanItem> {
        self.items
    }
}
