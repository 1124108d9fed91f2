use serde_json::json;
use tera::{Context, Tera};

use careplan_core::models::plan::CarePlanItem;

use crate::error::ExportError;

const CLIPBOARD_TEMPLATE_NAME: &str = "clipboard.txt";

const CLIPBOARD_TEMPLATE: &str = concat!(
    "【施設サービス計画書（第2表）】\n\n",
    "{% for item in items %}",
    "■ {{ loop.index }}. {{ item.categoryName }}\n",
    "【ニーズ】{{ item.needs }}\n",
    "【長期目標】{{ item.longTermGoal }}\n",
    "【短期目標】{{ item.shortTermGoal }}\n",
    "【サービス内容】{{ item.serviceContent }}\n\n",
    "{% endfor %}",
);

/// Render a Tera template with the plan items bound to `items`.
///
/// Field names follow the items' JSON form (`categoryName`, `needs`, ...).
pub fn render_template(
    template_name: &str,
    template_content: &str,
    items: &[CarePlanItem],
) -> Result<String, ExportError> {
    let mut tera = Tera::default();
    tera.add_raw_template(template_name, template_content)
        .map_err(|e| ExportError::TemplateParse(e.to_string()))?;

    let context = Context::from_value(json!({ "items": items }))
        .map_err(|e| ExportError::TemplateRender(e.to_string()))?;

    let rendered = tera.render(template_name, &context)?;
    Ok(rendered)
}

/// Plain-text rendering for pasting into a word processor.
pub fn render_clipboard(items: &[CarePlanItem]) -> Result<String, ExportError> {
    render_template(CLIPBOARD_TEMPLATE_NAME, CLIPBOARD_TEMPLATE, items)
}
