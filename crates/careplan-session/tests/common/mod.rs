#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use careplan_core::models::assessment::CategoryAssessment;
use careplan_core::models::patient::Patient;
use careplan_generate::client::{GenerationRequest, TextGenerator};
use careplan_generate::error::GenerateError;
use careplan_session::session::Session;
use careplan_storage::client::LocalStore;
use careplan_storage::records;

/// Replays canned responses in order and records each request.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: RefCell<VecDeque<Result<String, GenerateError>>>,
    requests: RefCell<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new(responses: impl IntoIterator<Item = Result<String, GenerateError>>) -> Self {
        Self {
            responses: RefCell::new(responses.into_iter().collect()),
            requests: RefCell::default(),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.borrow().last().cloned()
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&self, _api_key: &str, request: &GenerationRequest) -> Result<String, GenerateError> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }
}

pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub patient: Patient,
    pub session: Session<ScriptedGenerator>,
}

/// A session over a fresh store with one registered patient (not yet
/// selected) and, when `api_key` is set, a stored credential.
pub fn fixture(
    responses: impl IntoIterator<Item = Result<String, GenerateError>>,
    api_key: bool,
) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::open(dir.path()).unwrap();
    if api_key {
        records::save_api_key(&store, "test-key").unwrap();
    }
    let session = Session::new(store, ScriptedGenerator::new(responses));
    let patient = session
        .register_patient("山田 花子", Some(82), Some("要介護2"))
        .unwrap();
    Fixture {
        dir,
        patient,
        session,
    }
}

pub fn input(items: &[&str], detail: &str) -> CategoryAssessment {
    CategoryAssessment {
        checked_items: items.iter().map(|s| s.to_string()).collect(),
        detail_text: detail.to_string(),
    }
}

pub const PLAN_JSON: &str = r#"{"needs": "安全に食事を摂りたい", "longTermGoal": "安定した姿勢で食事ができる", "shortTermGoal": "座位を保持して食事ができる", "serviceContent": "姿勢の調整、見守り"}"#;
