use std::path::{Path, PathBuf};

use jiff::civil::Date;
use tracing::info;

use careplan_core::models::plan::{CarePlanItem, PlanField};

use crate::error::ExportError;

/// Byte-order mark so spreadsheet software detects UTF-8.
pub const BOM: char = '\u{FEFF}';

pub const HEADER: &str = "No.,カテゴリ,ニーズ,長期目標,短期目標,サービス内容";

/// Quote a field when it contains a comma, a double quote or a newline.
/// Embedded quotes are doubled.
pub fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render the plan as CSV: BOM, header, then one line per item numbered
/// from 1. Every line, the last included, ends with `\n`.
pub fn to_csv(items: &[CarePlanItem]) -> String {
    let mut out = String::new();
    out.push(BOM);
    out.push_str(HEADER);
    out.push('\n');

    for (index, item) in items.iter().enumerate() {
        let mut row = vec![(index + 1).to_string(), escape_csv(&item.category_name)];
        row.extend(PlanField::ALL.iter().map(|f| escape_csv(item.field(*f))));
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// Download name for a plan exported on `date`, e.g. `ケアプラン_2026-10-18.csv`.
pub fn csv_file_name(date: Date) -> String {
    format!("ケアプラン_{date}.csv")
}

/// Write the CSV rendering into `dir` and return the file's path.
pub fn write_csv_file(dir: &Path, date: Date, items: &[CarePlanItem]) -> Result<PathBuf, ExportError> {
    let path = dir.join(csv_file_name(date));
    std::fs::write(&path, to_csv(items)).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), count = items.len(), "care plan exported as CSV");
    Ok(path)
}
