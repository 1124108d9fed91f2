//! Typed access to the logical collections of the care-plan store:
//! the patient registry, per-patient care plans, and the API credential.

use tracing::info;
use uuid::Uuid;

use careplan_core::models::patient::Patient;
use careplan_core::models::plan::CarePlanItem;
use careplan_core::store_keys;

use crate::client::LocalStore;
use crate::error::StorageError;
use crate::state;

/// All registered patients, in registration order.
pub fn list_patients(store: &LocalStore) -> Result<Vec<Patient>, StorageError> {
    state::load_state_or_default(store, store_keys::PATIENTS)
}

/// Look up a single patient by ID.
pub fn find_patient(store: &LocalStore, id: Uuid) -> Result<Option<Patient>, StorageError> {
    Ok(list_patients(store)?.into_iter().find(|p| p.id == id))
}

/// Append a patient to the registry.
pub fn register_patient(store: &LocalStore, patient: &Patient) -> Result<(), StorageError> {
    let mut patients = list_patients(store)?;
    patients.push(patient.clone());
    state::save_state(store, store_keys::PATIENTS, &patients)?;
    info!(patient_id = %patient.id, count = patients.len(), "patient registered");
    Ok(())
}

/// The saved care plan for a patient; empty when none has been saved.
pub fn load_care_plan(store: &LocalStore, patient_id: Uuid) -> Result<Vec<CarePlanItem>, StorageError> {
    state::load_state_or_default(store, &store_keys::care_plan(patient_id))
}

/// Replace the saved care plan for a patient.
pub fn save_care_plan(
    store: &LocalStore,
    patient_id: Uuid,
    items: &[CarePlanItem],
) -> Result<(), StorageError> {
    state::save_state(store, &store_keys::care_plan(patient_id), items)?;
    info!(patient_id = %patient_id, count = items.len(), "care plan saved");
    Ok(())
}

/// The stored generation API key, if one has been configured.
///
/// A blank stored value counts as not configured.
pub fn load_api_key(store: &LocalStore) -> Result<Option<String>, StorageError> {
    let key: Option<String> = state::load_state_or_default(store, store_keys::API_KEY)?;
    Ok(key.filter(|k| !k.trim().is_empty()))
}

/// Store the generation API key, replacing any previous value.
pub fn save_api_key(store: &LocalStore, api_key: &str) -> Result<(), StorageError> {
    state::save_state(store, store_keys::API_KEY, api_key.trim())?;
    info!("api key saved");
    Ok(())
}
