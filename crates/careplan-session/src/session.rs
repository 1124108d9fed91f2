//! Commands over one drafting session.
//!
//! Every command takes `&mut Session` and returns the [`Screen`] the surface
//! should show next. Destructive steps are two-phase: the command stores a
//! [`PendingAction`] and returns [`Screen::Confirm`]; nothing happens until
//! [`Session::resolve`] is called with the user's [`Decision`].

use std::cell::Cell;
use std::path::{Path, PathBuf};

use jiff::civil::Date;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use careplan_core::catalog;
use careplan_core::models::assessment::{CategoryAssessment, CategoryStatus};
use careplan_core::models::patient::Patient;
use careplan_core::models::plan::{CarePlanItem, GeneratedPlan, PlanField};
use careplan_export::csv;
use careplan_generate::client::TextGenerator;
use careplan_generate::prompts::IntegratedCategory;
use careplan_generate::transaction;
use careplan_storage::client::LocalStore;
use careplan_storage::records;

use crate::assessment::AssessmentState;
use crate::error::SessionError;
use crate::plan_items::{MergeMode, PlanItemStore};

const SINGLE_CATEGORY_WARNING: &str = "1つのカテゴリのみチェックされています。\n\
統合生成ではなくカテゴリ別の生成をお勧めしますが、続けますか？";

// ── Render instructions ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    PatientList,
    Assessment,
    CarePlan,
    /// Ask the user to confirm or cancel `action`.
    Confirm { action: PendingAction },
}

/// A destructive or ambiguous step awaiting the user's decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingAction {
    DeleteItem { index: usize },
    DeleteGeneratedPlan { category_id: String },
    /// Confirm appends the generated plans to the existing rows; cancel
    /// replaces the rows with them.
    TransferPlans,
    DiscardAssessment,
    ApplyRefinement {
        index: usize,
        field: PlanField,
        text: String,
    },
}

impl PendingAction {
    /// Question shown to the user.
    pub fn prompt(&self) -> String {
        match self {
            PendingAction::DeleteItem { .. } => "この項目を削除しますか？".to_string(),
            PendingAction::DeleteGeneratedPlan { .. } => "生成されたプランを削除しますか？".to_string(),
            PendingAction::TransferPlans => {
                "既存の計画書項目に追加しますか？（「キャンセル」で上書き）".to_string()
            }
            PendingAction::DiscardAssessment => "入力内容が失われます。戻りますか？".to_string(),
            PendingAction::ApplyRefinement { field, text, .. } => {
                format!("{}を次の修正案に置き換えますか？\n{text}", field.label())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Cancel,
}

/// Checked categories gathered for integrated generation.
///
/// When only one category is checked the request carries a warning that
/// must be acknowledged before [`Session::run_integrated`] accepts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegratedRequest {
    categories: Vec<IntegratedCategory>,
    single_category_warning: Option<&'static str>,
    acknowledged: bool,
}

impl IntegratedRequest {
    pub fn categories(&self) -> &[IntegratedCategory] {
        &self.categories
    }

    pub fn single_category_warning(&self) -> Option<&'static str> {
        self.single_category_warning
    }

    pub fn acknowledge(mut self) -> Self {
        self.acknowledged = true;
        self
    }
}

// ── Busy flag ────────────────────────────────────────────────────────────────

/// Holds a busy flag set for its lifetime, clearing it on drop whether the
/// guarded call succeeded or failed.
pub struct BusyGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> BusyGuard<'a> {
    pub fn engage(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

// ── Snapshot ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: &'static str,
    pub name: &'static str,
    pub status: CategoryStatus,
    pub marker: &'static str,
    pub checked_items: Vec<String>,
    pub detail_text: String,
    pub generated_plan: Option<GeneratedPlan>,
}

/// Read-only view of the session for rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub patient: Option<Patient>,
    pub active_category_id: &'static str,
    pub categories: Vec<CategoryView>,
    pub checked_category_count: usize,
    pub generated_count: usize,
    pub plan_items: Vec<CarePlanItem>,
    pub pending: Option<PendingAction>,
    pub busy: bool,
}

// ── Session ──────────────────────────────────────────────────────────────────

pub struct Session<G> {
    store: LocalStore,
    generator: G,
    patient: Option<Patient>,
    assessment: AssessmentState,
    plan: PlanItemStore,
    pending: Option<PendingAction>,
    busy: Cell<bool>,
}

impl<G: TextGenerator> Session<G> {
    pub fn new(store: LocalStore, generator: G) -> Self {
        Self {
            store,
            generator,
            patient: None,
            assessment: AssessmentState::new(),
            plan: PlanItemStore::new(),
            pending: None,
            busy: Cell::new(false),
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn patient(&self) -> Option<&Patient> {
        self.patient.as_ref()
    }

    pub fn assessment(&self) -> &AssessmentState {
        &self.assessment
    }

    pub fn plan(&self) -> &PlanItemStore {
        &self.plan
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    // ── Patients ─────────────────────────────────────────────────────────────

    pub fn patients(&self) -> Result<Vec<Patient>, SessionError> {
        Ok(records::list_patients(&self.store)?)
    }

    pub fn register_patient(
        &self,
        name: &str,
        age: Option<u32>,
        care_level: Option<&str>,
    ) -> Result<Patient, SessionError> {
        let patient = Patient::register(name, age, care_level.map(str::to_string));
        records::register_patient(&self.store, &patient)?;
        Ok(patient)
    }

    /// Make `id` the current patient and load their saved plan.
    ///
    /// A patient with saved rows opens on the plan; otherwise a new
    /// assessment starts.
    pub fn select_patient(&mut self, id: Uuid) -> Result<Screen, SessionError> {
        let patient = records::find_patient(&self.store, id)?.ok_or(SessionError::UnknownPatient(id))?;
        let items = records::load_care_plan(&self.store, id)?;
        info!(patient_id = %id, items = items.len(), "patient selected");

        self.patient = Some(patient);
        self.plan = PlanItemStore::from_items(items);
        self.pending = None;

        if self.plan.is_empty() {
            Ok(self.start_new_assessment())
        } else {
            Ok(Screen::CarePlan)
        }
    }

    /// Clear assessment input and generated plans and focus the default
    /// category. Plan rows are kept.
    pub fn start_new_assessment(&mut self) -> Screen {
        self.assessment = AssessmentState::new();
        self.pending = None;
        Screen::Assessment
    }

    /// Leave the assessment screen, asking first if input would be lost.
    pub fn leave_assessment(&mut self) -> Screen {
        if self.assessment.has_unsaved_input() {
            self.set_pending(PendingAction::DiscardAssessment)
        } else {
            Screen::PatientList
        }
    }

    // ── Assessment ───────────────────────────────────────────────────────────

    pub fn record_category_input(
        &mut self,
        category_id: &str,
        checked_items: &[String],
        detail_text: &str,
    ) -> Result<(), SessionError> {
        self.assessment
            .record_category_input(category_id, checked_items, detail_text)
    }

    pub fn switch_category(
        &mut self,
        category_id: &str,
        pending_input: Option<&CategoryAssessment>,
    ) -> Result<Screen, SessionError> {
        self.assessment
            .switch_active_category(category_id, pending_input)?;
        Ok(Screen::Assessment)
    }

    /// Commit `pending_input` for the active category and generate its plan.
    pub fn generate_for_category(
        &mut self,
        pending_input: Option<&CategoryAssessment>,
    ) -> Result<Screen, SessionError> {
        self.commit_pending_input(pending_input)?;
        self.generate_active()
    }

    /// Focus `category_id` and generate again from its recorded input,
    /// overwriting the previous plan.
    pub fn regenerate(&mut self, category_id: &str) -> Result<Screen, SessionError> {
        self.assessment.switch_active_category(category_id, None)?;
        self.generate_active()
    }

    /// Move generated plans into the plan rows.
    ///
    /// With no existing rows the plans are appended directly; otherwise the
    /// user chooses between appending and replacing.
    pub fn transfer_generated_plans(&mut self) -> Screen {
        if self.plan.is_empty() {
            self.transfer(MergeMode::Append);
            Screen::CarePlan
        } else {
            self.set_pending(PendingAction::TransferPlans)
        }
    }

    /// Commit `pending_input` and gather every checked category.
    pub fn prepare_integrated(
        &mut self,
        pending_input: Option<&CategoryAssessment>,
    ) -> Result<IntegratedRequest, SessionError> {
        self.commit_pending_input(pending_input)?;

        let categories = self.assessment.checked_categories();
        if categories.is_empty() {
            return Err(SessionError::NoCheckedCategories);
        }

        let single_category_warning = (categories.len() == 1).then_some(SINGLE_CATEGORY_WARNING);
        Ok(IntegratedRequest {
            categories,
            single_category_warning,
            acknowledged: false,
        })
    }

    /// Generate one row per category of `request` and append them.
    pub fn run_integrated(&mut self, request: &IntegratedRequest) -> Result<Screen, SessionError> {
        if request.single_category_warning.is_some() && !request.acknowledged {
            return Err(SessionError::WarningNotAcknowledged);
        }
        let api_key = self.require_api_key()?;

        let records = {
            let _busy = BusyGuard::engage(&self.busy);
            transaction::generate_integrated_plans(&self.generator, &api_key, &request.categories)?
        };

        let added = self.plan.append_from_integrated_results(records);
        info!(added, "integrated plan generated");
        Ok(Screen::CarePlan)
    }

    // ── Plan rows ────────────────────────────────────────────────────────────

    /// Replace one field. Blank input leaves the field unchanged.
    pub fn edit_field(&mut self, index: usize, field: PlanField, value: &str) -> Result<Screen, SessionError> {
        self.plan.get(index)?;
        let value = value.trim();
        if value.is_empty() {
            debug!(index, %field, "blank edit ignored");
            return Ok(Screen::CarePlan);
        }
        self.plan.edit_field(index, field, value.to_string())?;
        Ok(Screen::CarePlan)
    }

    /// Ask the model for a rewrite of one field and propose it for
    /// confirmation.
    pub fn refine_field(
        &mut self,
        index: usize,
        field: PlanField,
        instruction: &str,
    ) -> Result<Screen, SessionError> {
        self.plan.get(index)?;
        let api_key = self.require_api_key()?;

        let proposal = {
            let _busy = BusyGuard::engage(&self.busy);
            self.plan
                .refine_field(&self.generator, &api_key, index, field, instruction)?
        };

        match proposal {
            Some(text) => Ok(self.set_pending(PendingAction::ApplyRefinement { index, field, text })),
            None => {
                warn!(index, %field, "refinement returned no text");
                Ok(Screen::CarePlan)
            }
        }
    }

    /// Persist the plan rows for the current patient. Returns the row count.
    pub fn save_care_plan(&self) -> Result<usize, SessionError> {
        let patient = self.patient.as_ref().ok_or(SessionError::NoPatientSelected)?;
        records::save_care_plan(&self.store, patient.id, self.plan.items())?;
        Ok(self.plan.len())
    }

    /// Write the plan as CSV into `dir`, named after `date`.
    pub fn export_csv(&self, dir: &Path, date: Date) -> Result<PathBuf, SessionError> {
        if self.plan.is_empty() {
            return Err(SessionError::NoPlanItems);
        }
        Ok(csv::write_csv_file(dir, date, self.plan.items())?)
    }

    pub fn clipboard_text(&self) -> Result<String, SessionError> {
        if self.plan.is_empty() {
            return Err(SessionError::NoPlanItems);
        }
        self.plan.serialize_for_clipboard()
    }

    // ── Confirmations ────────────────────────────────────────────────────────

    /// Validate `action` and hold it until [`Session::resolve`].
    pub fn propose(&mut self, action: PendingAction) -> Result<Screen, SessionError> {
        match &action {
            PendingAction::DeleteItem { index } | PendingAction::ApplyRefinement { index, .. } => {
                self.plan.get(*index)?;
            }
            PendingAction::DeleteGeneratedPlan { category_id } => {
                catalog::require_category(category_id)?;
            }
            PendingAction::TransferPlans | PendingAction::DiscardAssessment => {}
        }
        Ok(self.set_pending(action))
    }

    /// Carry out or drop the pending action.
    pub fn resolve(&mut self, decision: Decision) -> Result<Screen, SessionError> {
        let action = self.pending.take().ok_or(SessionError::NothingPending)?;
        info!(?action, ?decision, "pending action resolved");

        let confirmed = decision == Decision::Confirm;
        match action {
            PendingAction::DeleteItem { index } => {
                if confirmed {
                    self.plan.delete_item(index)?;
                }
                Ok(Screen::CarePlan)
            }
            PendingAction::DeleteGeneratedPlan { category_id } => {
                if confirmed {
                    self.assessment.delete_generated_plan(&category_id);
                }
                Ok(Screen::Assessment)
            }
            PendingAction::TransferPlans => {
                let mode = if confirmed {
                    MergeMode::Append
                } else {
                    MergeMode::Replace
                };
                self.transfer(mode);
                Ok(Screen::CarePlan)
            }
            PendingAction::DiscardAssessment => {
                if confirmed {
                    self.assessment = AssessmentState::new();
                    Ok(Screen::PatientList)
                } else {
                    Ok(Screen::Assessment)
                }
            }
            PendingAction::ApplyRefinement { index, field, text } => {
                if confirmed {
                    self.plan.edit_field(index, field, text)?;
                }
                Ok(Screen::CarePlan)
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> SessionSnapshot {
        let categories = catalog::all_categories()
            .iter()
            .map(|c| {
                let input = self.assessment.assessment(c.id);
                let status = self.assessment.category_status(c.id);
                CategoryView {
                    id: c.id,
                    name: c.name,
                    status,
                    marker: status.marker(),
                    checked_items: input.map(|a| a.checked_items.clone()).unwrap_or_default(),
                    detail_text: input.map(|a| a.detail_text.clone()).unwrap_or_default(),
                    generated_plan: self.assessment.generated_plan(c.id).cloned(),
                }
            })
            .collect();

        SessionSnapshot {
            patient: self.patient.clone(),
            active_category_id: self.assessment.active_category().id,
            categories,
            checked_category_count: self.assessment.checked_category_count(),
            generated_count: self.assessment.generated_count(),
            plan_items: self.plan.items().to_vec(),
            pending: self.pending.clone(),
            busy: self.busy.get(),
        }
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn set_pending(&mut self, action: PendingAction) -> Screen {
        if let Some(previous) = self.pending.replace(action.clone()) {
            debug!(?previous, "pending action superseded");
        }
        Screen::Confirm { action }
    }

    fn require_api_key(&self) -> Result<String, SessionError> {
        records::load_api_key(&self.store)?.ok_or(SessionError::MissingCredential)
    }

    fn commit_pending_input(&mut self, pending_input: Option<&CategoryAssessment>) -> Result<(), SessionError> {
        if let Some(input) = pending_input {
            let active = self.assessment.active_category().id;
            self.assessment
                .record_category_input(active, &input.checked_items, &input.detail_text)?;
        }
        Ok(())
    }

    fn generate_active(&mut self) -> Result<Screen, SessionError> {
        let category = self.assessment.active_category();
        let input = self
            .assessment
            .assessment(category.id)
            .filter(|a| a.has_checked_items())
            .cloned()
            .ok_or_else(|| SessionError::NoCheckedItems {
                category: category.name.to_string(),
            })?;
        let api_key = self.require_api_key()?;

        let plan = {
            let _busy = BusyGuard::engage(&self.busy);
            transaction::generate_category_plan(
                &self.generator,
                &api_key,
                category.name,
                &input.checked_items,
                &input.detail_text,
            )?
        };

        self.assessment.set_generated_plan(category.id, plan)?;
        info!(category_id = category.id, "category plan generated");
        Ok(Screen::Assessment)
    }

    fn transfer(&mut self, mode: MergeMode) {
        self.plan
            .append_from_generated_plans(self.assessment.generated_plans(), mode);
    }
}
