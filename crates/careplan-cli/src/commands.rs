use std::io::{self, Write};
use std::path::Path;

use eyre::{Result, bail};
use uuid::Uuid;

use careplan_cli::config::{self, CareplanConfig};
use careplan_cli::input;
use careplan_core::catalog;
use careplan_core::models::assessment::CategoryAssessment;
use careplan_core::models::plan::PlanField;
use careplan_generate::client::TextGenerator;
use careplan_session::session::{Decision, PendingAction, Screen, Session};
use careplan_storage::records;

use crate::MergeArg;

/// Ask a yes/no question on stderr; anything but `y`/`yes` is no.
fn ask(prompt: &str) -> Result<bool> {
    eprint!("{prompt} [y/N] ");
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

/// Answer confirmations until the session moves to a regular screen.
fn settle<G: TextGenerator>(session: &mut Session<G>, mut screen: Screen, assume_yes: bool) -> Result<Screen> {
    while let Screen::Confirm { action } = &screen {
        let decision = if assume_yes || ask(&action.prompt())? {
            Decision::Confirm
        } else {
            Decision::Cancel
        };
        screen = session.resolve(decision)?;
    }
    Ok(screen)
}

fn row_index(no: usize) -> Result<usize> {
    match no.checked_sub(1) {
        Some(index) => Ok(index),
        None => bail!("row numbers start at 1"),
    }
}

fn print_plan<G: TextGenerator>(session: &Session<G>) {
    if let Some(patient) = session.patient() {
        println!("{} {}", patient.name, patient.summary());
    }
    let items = session.plan().items();
    if items.is_empty() {
        println!("(計画書の項目はありません)");
        return;
    }
    for (index, item) in items.iter().enumerate() {
        println!("■ {}. {}", index + 1, item.category_name);
        for field in PlanField::ALL {
            println!("  【{}】{}", field.label(), item.field(field));
        }
    }
}

fn save<G: TextGenerator>(session: &Session<G>) -> Result<()> {
    let count = session.save_care_plan()?;
    println!("計画書を保存しました（{count}件）");
    Ok(())
}

// ── Settings ─────────────────────────────────────────────────────────────────

pub fn set_api_key<G: TextGenerator>(session: &Session<G>, key: &str) -> Result<()> {
    if key.trim().is_empty() {
        bail!("API key is empty");
    }
    records::save_api_key(session.store(), key)?;
    println!("API key saved ({})", config::redact_api_key(key.trim()));
    Ok(())
}

pub fn show_settings<G: TextGenerator>(
    session: &Session<G>,
    config: &CareplanConfig,
    config_path: &Path,
) -> Result<()> {
    let api_key = records::load_api_key(session.store())?;
    let info = config::config_info(config, config_path, session.store().root(), api_key.as_deref());
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

// ── Patients and catalog ─────────────────────────────────────────────────────

pub fn add_patient<G: TextGenerator>(
    session: &Session<G>,
    name: &str,
    age: Option<u32>,
    care_level: Option<&str>,
) -> Result<()> {
    if name.trim().is_empty() {
        bail!("patient name is empty");
    }
    let patient = session.register_patient(name.trim(), age, care_level)?;
    println!("{}\t{}\t{}", patient.id, patient.name, patient.summary());
    Ok(())
}

pub fn list_patients<G: TextGenerator>(session: &Session<G>) -> Result<()> {
    let patients = session.patients()?;
    if patients.is_empty() {
        println!("利用者が登録されていません");
    }
    for patient in patients {
        println!("{}\t{}\t{}", patient.id, patient.name, patient.summary());
    }
    Ok(())
}

pub fn list_categories() -> Result<()> {
    for category in catalog::all_categories() {
        println!("{}\t{}", category.id, category.name);
        for (n, item) in category.items.iter().enumerate() {
            println!("  {}. {item}", n + 1);
        }
    }
    Ok(())
}

// ── Generation ───────────────────────────────────────────────────────────────

pub fn generate<G: TextGenerator>(
    session: &mut Session<G>,
    patient: Uuid,
    category_id: &str,
    items: &[String],
    detail: &str,
    merge: Option<MergeArg>,
) -> Result<()> {
    let category = catalog::require_category(category_id)?;
    session.select_patient(patient)?;
    session.start_new_assessment();
    session.switch_category(category.id, None)?;

    let pending = CategoryAssessment {
        checked_items: input::resolve_items(category, items),
        detail_text: detail.to_string(),
    };
    session.generate_for_category(Some(&pending))?;

    let screen = session.transfer_generated_plans();
    match (screen, merge) {
        (Screen::Confirm { .. }, Some(MergeArg::Append)) => {
            session.resolve(Decision::Confirm)?;
        }
        (Screen::Confirm { .. }, Some(MergeArg::Replace)) => {
            session.resolve(Decision::Cancel)?;
        }
        (screen, _) => {
            settle(session, screen, false)?;
        }
    }

    print_plan(session);
    save(session)
}

pub fn integrate<G: TextGenerator>(
    session: &mut Session<G>,
    patient: Uuid,
    file: &Path,
    yes: bool,
) -> Result<()> {
    let entries = input::load_assessment_file(file)?;
    session.select_patient(patient)?;
    session.start_new_assessment();
    for (category_id, assessment) in &entries {
        session.record_category_input(category_id, &assessment.checked_items, &assessment.detail_text)?;
    }

    let mut request = session.prepare_integrated(None)?;
    if let Some(warning) = request.single_category_warning() {
        if !(yes || ask(warning)?) {
            bail!("integrated generation cancelled");
        }
        request = request.acknowledge();
    }

    let before = session.plan().len();
    session.run_integrated(&request)?;
    println!("{}件の統合計画書を生成しました", session.plan().len() - before);

    print_plan(session);
    save(session)
}

// ── Plan rows ────────────────────────────────────────────────────────────────

pub fn show_plan<G: TextGenerator>(session: &mut Session<G>, patient: Uuid) -> Result<()> {
    session.select_patient(patient)?;
    print_plan(session);
    Ok(())
}

pub fn edit_field<G: TextGenerator>(
    session: &mut Session<G>,
    patient: Uuid,
    no: usize,
    field: PlanField,
    value: &str,
) -> Result<()> {
    session.select_patient(patient)?;
    session.edit_field(row_index(no)?, field, value)?;
    save(session)
}

pub fn refine_field<G: TextGenerator>(
    session: &mut Session<G>,
    patient: Uuid,
    no: usize,
    field: PlanField,
    instruction: &str,
    yes: bool,
) -> Result<()> {
    session.select_patient(patient)?;
    let screen = session.refine_field(row_index(no)?, field, instruction)?;

    if session.pending().is_none() {
        println!("修正案が得られませんでした");
        return Ok(());
    }
    if let Some(PendingAction::ApplyRefinement { text, .. }) = session.pending() {
        println!("{text}");
    }
    settle(session, screen, yes)?;
    save(session)
}

pub fn delete_item<G: TextGenerator>(session: &mut Session<G>, patient: Uuid, no: usize, yes: bool) -> Result<()> {
    session.select_patient(patient)?;
    let screen = session.propose(PendingAction::DeleteItem {
        index: row_index(no)?,
    })?;
    settle(session, screen, yes)?;
    save(session)
}

pub fn export_csv<G: TextGenerator>(session: &mut Session<G>, patient: Uuid, out_dir: &Path) -> Result<()> {
    session.select_patient(patient)?;
    let today = jiff::Zoned::now().date();
    let path = session.export_csv(out_dir, today)?;
    println!("{}", path.display());
    Ok(())
}

pub fn copy_text<G: TextGenerator>(session: &mut Session<G>, patient: Uuid) -> Result<()> {
    session.select_patient(patient)?;
    print!("{}", session.clipboard_text()?);
    Ok(())
}
