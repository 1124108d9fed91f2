use tracing::{debug, info};
use uuid::Uuid;

use careplan_core::models::plan::GeneratedPlan;

use crate::client::{GenerationKind, GenerationRequest, TextGenerator};
use crate::error::GenerateError;
use crate::parse;
use crate::prompts::{self, IntegratedCategory};

/// Generate the four plan fields for one category.
///
/// Only transport and HTTP failures are errors; malformed output becomes a
/// fallback or placeholder-filled record.
pub fn generate_category_plan(
    generator: &dyn TextGenerator,
    api_key: &str,
    category_name: &str,
    checked_items: &[String],
    detail_text: &str,
) -> Result<GeneratedPlan, GenerateError> {
    let transaction_id = Uuid::new_v4();
    info!(%transaction_id, category_name, items = checked_items.len(), "starting category generation");

    let prompt = prompts::build_category_prompt(category_name, checked_items, detail_text);
    debug!(%transaction_id, prompt = %prompt, "category prompt");

    let request = GenerationRequest::new(GenerationKind::SingleCategory, prompt);
    let text = generator.generate(api_key, &request)?;
    debug!(%transaction_id, response = %text, "category response");

    let plan = parse::parse_category_response(&text, category_name);
    info!(%transaction_id, category_name, "category generation complete");
    Ok(plan)
}

/// Generate one record per category from a single joint analysis.
///
/// The result always has exactly `categories.len()` records.
pub fn generate_integrated_plans(
    generator: &dyn TextGenerator,
    api_key: &str,
    categories: &[IntegratedCategory],
) -> Result<Vec<GeneratedPlan>, GenerateError> {
    let transaction_id = Uuid::new_v4();
    info!(%transaction_id, categories = categories.len(), "starting integrated generation");

    let prompt = prompts::build_integrated_prompt(categories);
    debug!(%transaction_id, prompt = %prompt, "integrated prompt");

    let request = GenerationRequest::new(GenerationKind::Integrated, prompt);
    let text = generator.generate(api_key, &request)?;
    debug!(%transaction_id, response = %text, "integrated response");

    let records = parse::parse_integrated_response(&text, categories);
    info!(%transaction_id, records = records.len(), "integrated generation complete");
    Ok(records)
}

/// Ask the model to rewrite `current_text` according to `instruction`.
///
/// Returns the trimmed replacement, or `None` if the model returned nothing.
pub fn refine_text(
    generator: &dyn TextGenerator,
    api_key: &str,
    current_text: &str,
    instruction: &str,
) -> Result<Option<String>, GenerateError> {
    let transaction_id = Uuid::new_v4();
    info!(%transaction_id, "starting refinement");

    let prompt = prompts::build_refinement_prompt(current_text, instruction);
    let request = GenerationRequest::new(GenerationKind::Refinement, prompt);
    let text = generator.generate(api_key, &request)?;

    let refined = parse::parse_refinement_response(&text);
    info!(%transaction_id, produced = refined.is_some(), "refinement complete");
    Ok(refined)
}
