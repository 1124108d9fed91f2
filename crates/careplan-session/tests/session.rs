mod common;

use std::cell::Cell;

use careplan_core::models::assessment::CategoryStatus;
use careplan_core::models::plan::{CarePlanItem, PlanField};
use careplan_generate::client::GenerationKind;
use careplan_generate::error::GenerateError;
use careplan_generate::parse::GENERATION_FAILED;
use careplan_session::error::SessionError;
use careplan_session::session::{BusyGuard, Decision, PendingAction, Screen};
use careplan_storage::records;
use uuid::Uuid;

use common::{PLAN_JSON, fixture, input};

fn saved_item(needs: &str) -> CarePlanItem {
    CarePlanItem {
        category_id: Some("bathing".into()),
        category_name: "入浴".into(),
        needs: needs.into(),
        long_term_goal: "l".into(),
        short_term_goal: "s".into(),
        service_content: "c".into(),
    }
}

// ── End to end ───────────────────────────────────────────────────────────────

#[test]
fn truncated_single_generation_recovers_leading_fields() {
    let truncated = "```json\n{\n  \"needs\": \"安全に食事を摂りたい\",\n  \"longTermGoal\": \"安定した姿勢で食事ができる\",\n  \"shortTermGoal\": \"座位を保";
    let mut fx = fixture([Ok(truncated.to_string())], true);

    assert_eq!(fx.session.select_patient(fx.patient.id).unwrap(), Screen::Assessment);
    let screen = fx
        .session
        .generate_for_category(Some(&input(&["食事の姿勢が不安定"], "")))
        .unwrap();
    assert_eq!(screen, Screen::Assessment);

    let plan = fx.session.assessment().generated_plan("meal").unwrap().clone();
    assert_eq!(plan.category_name, "食事");
    assert_eq!(plan.needs, "安全に食事を摂りたい");
    assert_eq!(plan.long_term_goal, "安定した姿勢で食事ができる");
    assert_eq!(plan.short_term_goal, GENERATION_FAILED);
    assert_eq!(plan.service_content, GENERATION_FAILED);
    assert_eq!(fx.session.assessment().category_status("meal"), CategoryStatus::Generated);

    let request = fx.session.generator().last_request().unwrap();
    assert_eq!(request.kind, GenerationKind::SingleCategory);
    assert_eq!(request.max_output_tokens, 4096);
    assert!(request.prompt.contains("食事の姿勢が不安定"));

    assert_eq!(fx.session.transfer_generated_plans(), Screen::CarePlan);
    assert_eq!(fx.session.save_care_plan().unwrap(), 1);

    let saved = records::load_care_plan(fx.session.store(), fx.patient.id).unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].category_id.as_deref(), Some("meal"));
    assert_eq!(saved[0].short_term_goal, GENERATION_FAILED);
}

#[test]
fn integrated_generation_appends_one_row_per_category() {
    let response = r#"```json
[
  {"categoryName": "食事", "needs": "安全に生活したい", "longTermGoal": "l", "shortTermGoal": "s1", "serviceContent": "c1"},
  {"categoryName": "排泄", "needs": "安全に生活したい", "longTermGoal": "l", "shortTermGoal": "s2"}
]
```"#;
    let mut fx = fixture([Ok(response.to_string())], true);
    records::save_care_plan(fx.session.store(), fx.patient.id, &[saved_item("既存")]).unwrap();

    assert_eq!(fx.session.select_patient(fx.patient.id).unwrap(), Screen::CarePlan);
    assert_eq!(fx.session.start_new_assessment(), Screen::Assessment);
    fx.session
        .record_category_input("excretion", &["失禁がある".to_string()], "夜間のみ")
        .unwrap();

    let request = fx
        .session
        .prepare_integrated(Some(&input(&["むせ込みがある"], "")))
        .unwrap();
    assert_eq!(request.single_category_warning(), None);
    assert_eq!(request.categories().len(), 2);

    assert_eq!(fx.session.run_integrated(&request).unwrap(), Screen::CarePlan);

    let items = fx.session.plan().items();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].needs, "既存");
    assert!(items[1..].iter().all(|i| i.category_id.is_none()));
    assert_eq!(items[1].service_content, "c1");
    assert_eq!(items[2].category_name, "排泄");
    assert_eq!(items[2].service_content, "");

    let sent = fx.session.generator().last_request().unwrap();
    assert_eq!(sent.kind, GenerationKind::Integrated);
    assert!(sent.prompt.contains("【カテゴリ1: 食事】"));
    assert!(sent.prompt.contains("【カテゴリ2: 排泄】"));
}

// ── Validation and failures ──────────────────────────────────────────────────

#[test]
fn generation_without_checked_items_issues_no_call() {
    let mut fx = fixture([], true);
    fx.session.select_patient(fx.patient.id).unwrap();

    let err = fx
        .session
        .generate_for_category(Some(&input(&[], "詳細のみ")))
        .unwrap_err();
    assert!(matches!(err, SessionError::NoCheckedItems { category } if category == "食事"));
    assert!(matches!(
        fx.session.prepare_integrated(None),
        Err(SessionError::NoCheckedCategories)
    ));
    assert_eq!(fx.session.generator().request_count(), 0);
}

#[test]
fn missing_credential_issues_no_call() {
    let mut fx = fixture([Ok(PLAN_JSON.to_string())], false);
    fx.session.select_patient(fx.patient.id).unwrap();

    let err = fx
        .session
        .generate_for_category(Some(&input(&["むせ込みがある"], "")))
        .unwrap_err();
    assert!(matches!(err, SessionError::MissingCredential));
    assert!(err.to_string().contains("careplan settings set-api-key"));
    assert_eq!(fx.session.generator().request_count(), 0);
    assert!(!fx.session.is_busy());
}

#[test]
fn api_failure_leaves_state_untouched_and_clears_busy() {
    let mut fx = fixture(
        [Err(GenerateError::Http {
            status: 400,
            message: "API key not valid.".into(),
        })],
        true,
    );
    fx.session.select_patient(fx.patient.id).unwrap();

    let err = fx
        .session
        .generate_for_category(Some(&input(&["むせ込みがある"], "")))
        .unwrap_err();
    assert!(matches!(err, SessionError::Generate(GenerateError::Http { status: 400, .. })));
    assert!(err.to_string().contains("API key not valid."));

    assert!(!fx.session.is_busy());
    assert!(fx.session.assessment().generated_plan("meal").is_none());
    assert_eq!(
        fx.session.assessment().assessment("meal").unwrap().checked_items,
        ["むせ込みがある"]
    );
    assert!(fx.session.plan().is_empty());
}

#[test]
fn busy_guard_clears_flag_on_drop() {
    let flag = Cell::new(false);
    {
        let _guard = BusyGuard::engage(&flag);
        assert!(flag.get());
    }
    assert!(!flag.get());
}

#[test]
fn single_category_integration_needs_acknowledgement() {
    let mut fx = fixture([Ok("[]".to_string())], true);
    fx.session.select_patient(fx.patient.id).unwrap();

    let request = fx
        .session
        .prepare_integrated(Some(&input(&["むせ込みがある"], "")))
        .unwrap();
    assert!(request.single_category_warning().is_some());

    let err = fx.session.run_integrated(&request).unwrap_err();
    assert!(matches!(err, SessionError::WarningNotAcknowledged));
    assert_eq!(fx.session.generator().request_count(), 0);

    fx.session.run_integrated(&request.acknowledge()).unwrap();
    // An empty array is padded with the fallback record.
    assert_eq!(fx.session.plan().len(), 1);
    assert_eq!(fx.session.plan().items()[0].category_name, "食事");
}

#[test]
fn unknown_patient_and_unsaved_session() {
    let mut fx = fixture([], true);
    let missing = Uuid::new_v4();
    assert!(matches!(
        fx.session.select_patient(missing),
        Err(SessionError::UnknownPatient(id)) if id == missing
    ));
    assert!(matches!(
        fx.session.save_care_plan(),
        Err(SessionError::NoPatientSelected)
    ));
}

// ── Confirmations ────────────────────────────────────────────────────────────

#[test]
fn transfer_onto_existing_rows_asks_append_or_replace() {
    let mut fx = fixture([Ok(PLAN_JSON.to_string()), Ok(PLAN_JSON.to_string())], true);
    records::save_care_plan(fx.session.store(), fx.patient.id, &[saved_item("既存")]).unwrap();
    fx.session.select_patient(fx.patient.id).unwrap();
    fx.session.start_new_assessment();
    fx.session
        .generate_for_category(Some(&input(&["むせ込みがある"], "")))
        .unwrap();

    let screen = fx.session.transfer_generated_plans();
    assert_eq!(
        screen,
        Screen::Confirm {
            action: PendingAction::TransferPlans
        }
    );
    assert_eq!(fx.session.plan().len(), 1);

    assert_eq!(fx.session.resolve(Decision::Confirm).unwrap(), Screen::CarePlan);
    assert_eq!(fx.session.plan().len(), 2);
    assert_eq!(fx.session.plan().items()[1].category_id.as_deref(), Some("meal"));

    fx.session.transfer_generated_plans();
    fx.session.resolve(Decision::Cancel).unwrap();
    assert_eq!(fx.session.plan().len(), 1);
    assert_eq!(fx.session.plan().items()[0].needs, "安全に食事を摂りたい");
}

#[test]
fn delete_item_waits_for_confirmation() {
    let mut fx = fixture([], true);
    records::save_care_plan(
        fx.session.store(),
        fx.patient.id,
        &[saved_item("a"), saved_item("b")],
    )
    .unwrap();
    fx.session.select_patient(fx.patient.id).unwrap();

    assert!(matches!(
        fx.session.propose(PendingAction::DeleteItem { index: 2 }),
        Err(SessionError::IndexOutOfRange { index: 2, len: 2 })
    ));

    fx.session.propose(PendingAction::DeleteItem { index: 0 }).unwrap();
    fx.session.resolve(Decision::Cancel).unwrap();
    assert_eq!(fx.session.plan().len(), 2);

    fx.session.propose(PendingAction::DeleteItem { index: 0 }).unwrap();
    fx.session.resolve(Decision::Confirm).unwrap();
    assert_eq!(fx.session.plan().len(), 1);
    assert_eq!(fx.session.plan().items()[0].needs, "b");

    assert!(matches!(
        fx.session.resolve(Decision::Confirm),
        Err(SessionError::NothingPending)
    ));
}

#[test]
fn refinement_is_applied_only_after_confirmation() {
    let mut fx = fixture(
        [
            Ok("  安定した座位で食事ができる\n".to_string()),
            Ok("別の案".to_string()),
            Ok(String::new()),
        ],
        true,
    );
    records::save_care_plan(fx.session.store(), fx.patient.id, &[saved_item("a")]).unwrap();
    fx.session.select_patient(fx.patient.id).unwrap();

    let screen = fx
        .session
        .refine_field(0, PlanField::LongTermGoal, "")
        .unwrap();
    let expected = PendingAction::ApplyRefinement {
        index: 0,
        field: PlanField::LongTermGoal,
        text: "安定した座位で食事ができる".into(),
    };
    assert_eq!(screen, Screen::Confirm { action: expected.clone() });
    assert_eq!(fx.session.plan().items()[0].long_term_goal, "l");
    assert_eq!(fx.session.generator().last_request().unwrap().max_output_tokens, 2048);
    assert!(expected.prompt().contains("長期目標"));

    fx.session.resolve(Decision::Confirm).unwrap();
    assert_eq!(fx.session.plan().items()[0].long_term_goal, "安定した座位で食事ができる");

    fx.session
        .refine_field(0, PlanField::Needs, "短く")
        .unwrap();
    fx.session.resolve(Decision::Cancel).unwrap();
    assert_eq!(fx.session.plan().items()[0].needs, "a");

    // No text back: nothing to confirm.
    assert_eq!(
        fx.session.refine_field(0, PlanField::Needs, "").unwrap(),
        Screen::CarePlan
    );
    assert!(fx.session.pending().is_none());
}

#[test]
fn regenerate_and_delete_generated_plan() {
    let second = PLAN_JSON.replace("安全に食事を摂りたい", "むせずに食べたい");
    let mut fx = fixture([Ok(PLAN_JSON.to_string()), Ok(second)], true);
    fx.session.select_patient(fx.patient.id).unwrap();

    fx.session
        .generate_for_category(Some(&input(&["むせ込みがある"], "")))
        .unwrap();
    fx.session
        .switch_category("bathing", None)
        .unwrap();
    fx.session.regenerate("meal").unwrap();

    assert_eq!(fx.session.assessment().active_category().id, "meal");
    assert_eq!(fx.session.assessment().generated_count(), 1);
    assert_eq!(
        fx.session.assessment().generated_plan("meal").unwrap().needs,
        "むせずに食べたい"
    );

    fx.session
        .propose(PendingAction::DeleteGeneratedPlan {
            category_id: "meal".into(),
        })
        .unwrap();
    assert_eq!(fx.session.resolve(Decision::Confirm).unwrap(), Screen::Assessment);
    assert_eq!(fx.session.assessment().generated_count(), 0);
    assert_eq!(fx.session.assessment().category_status("meal"), CategoryStatus::HasData);
}

#[test]
fn proposing_delete_of_unknown_category_is_rejected() {
    let mut fx = fixture([], true);
    let err = fx
        .session
        .propose(PendingAction::DeleteGeneratedPlan {
            category_id: "cooking".into(),
        })
        .unwrap_err();
    assert!(matches!(err, SessionError::UnknownCategory(id) if id == "cooking"));
    assert!(fx.session.pending().is_none());
}

#[test]
fn core_errors_convert_into_session_errors() {
    use careplan_core::error::CoreError;

    let err = SessionError::from(CoreError::UnknownCategory("cooking".into()));
    assert!(matches!(err, SessionError::UnknownCategory(id) if id == "cooking"));

    let err = SessionError::from(CoreError::UnknownField("memo".into()));
    assert!(matches!(err, SessionError::Core(CoreError::UnknownField(_))));
}

#[test]
fn leaving_assessment_with_input_asks_first() {
    let mut fx = fixture([], true);
    fx.session.select_patient(fx.patient.id).unwrap();
    assert_eq!(fx.session.leave_assessment(), Screen::PatientList);

    fx.session
        .switch_category("excretion", Some(&input(&["むせ込みがある"], "")))
        .unwrap();
    assert_eq!(
        fx.session.leave_assessment(),
        Screen::Confirm {
            action: PendingAction::DiscardAssessment
        }
    );
    assert_eq!(fx.session.resolve(Decision::Cancel).unwrap(), Screen::Assessment);
    assert!(fx.session.assessment().has_unsaved_input());

    fx.session.leave_assessment();
    assert_eq!(fx.session.resolve(Decision::Confirm).unwrap(), Screen::PatientList);
    assert!(!fx.session.assessment().has_unsaved_input());
}

// ── Plan rows ────────────────────────────────────────────────────────────────

#[test]
fn blank_edit_is_ignored() {
    let mut fx = fixture([], true);
    records::save_care_plan(fx.session.store(), fx.patient.id, &[saved_item("a")]).unwrap();
    fx.session.select_patient(fx.patient.id).unwrap();

    fx.session.edit_field(0, PlanField::Needs, "   ").unwrap();
    assert_eq!(fx.session.plan().items()[0].needs, "a");

    fx.session.edit_field(0, PlanField::Needs, " 新しいニーズ ").unwrap();
    assert_eq!(fx.session.plan().items()[0].needs, "新しいニーズ");

    assert!(fx.session.edit_field(3, PlanField::Needs, "x").is_err());
}

#[test]
fn export_requires_rows() {
    let mut fx = fixture([], true);
    fx.session.select_patient(fx.patient.id).unwrap();
    let date = jiff::civil::date(2026, 10, 18);

    assert!(matches!(
        fx.session.export_csv(fx.dir.path(), date),
        Err(SessionError::NoPlanItems)
    ));
    assert!(matches!(
        fx.session.clipboard_text(),
        Err(SessionError::NoPlanItems)
    ));

    records::save_care_plan(fx.session.store(), fx.patient.id, &[saved_item("a")]).unwrap();
    fx.session.select_patient(fx.patient.id).unwrap();
    let path = fx.session.export_csv(fx.dir.path(), date).unwrap();
    assert!(path.ends_with("ケアプラン_2026-10-18.csv"));
    assert!(fx.session.clipboard_text().unwrap().contains("■ 1. 入浴"));
}

#[test]
fn snapshot_reflects_session() {
    let mut fx = fixture([Ok(PLAN_JSON.to_string())], true);
    fx.session.select_patient(fx.patient.id).unwrap();
    fx.session
        .generate_for_category(Some(&input(&["むせ込みがある"], "")))
        .unwrap();
    fx.session
        .record_category_input("bathing", &[], "シャワー浴")
        .unwrap();

    let snapshot = fx.session.snapshot();
    assert_eq!(snapshot.patient.as_ref().map(|p| p.id), Some(fx.patient.id));
    assert_eq!(snapshot.active_category_id, "meal");
    assert_eq!(snapshot.categories.len(), 9);
    assert_eq!(snapshot.categories[0].marker, "✓");
    assert_eq!(snapshot.categories[2].id, "bathing");
    assert_eq!(snapshot.categories[2].marker, "●");
    assert_eq!(snapshot.categories[1].marker, "");
    assert_eq!(snapshot.checked_category_count, 1);
    assert_eq!(snapshot.generated_count, 1);
    assert!(!snapshot.busy);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["categories"][0]["status"], "generated");
}
