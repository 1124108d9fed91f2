use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// One of the four free-text columns of a care-plan row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum PlanField {
    /// 生活全般の解決すべき課題（ニーズ）.
    Needs,
    LongTermGoal,
    ShortTermGoal,
    ServiceContent,
}

impl PlanField {
    pub const ALL: [PlanField; 4] = [
        PlanField::Needs,
        PlanField::LongTermGoal,
        PlanField::ShortTermGoal,
        PlanField::ServiceContent,
    ];

    /// Key used for this field in generated JSON records.
    pub fn key(self) -> &'static str {
        match self {
            PlanField::Needs => "needs",
            PlanField::LongTermGoal => "longTermGoal",
            PlanField::ShortTermGoal => "shortTermGoal",
            PlanField::ServiceContent => "serviceContent",
        }
    }

    /// Localized label, also accepted by the parser as a fallback key.
    pub fn label(self) -> &'static str {
        match self {
            PlanField::Needs => "ニーズ",
            PlanField::LongTermGoal => "長期目標",
            PlanField::ShortTermGoal => "短期目標",
            PlanField::ServiceContent => "サービス内容",
        }
    }
}

impl fmt::Display for PlanField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PlanField {
    type Err = CoreError;

    /// Accepts the JSON key (`longTermGoal`), its snake/kebab spelling
    /// (`long_term_goal`, `long-term-goal`) or the localized label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(['_', '-'], "").to_lowercase();
        PlanField::ALL
            .into_iter()
            .find(|f| f.key().to_lowercase() == normalized || f.label() == s.trim())
            .ok_or_else(|| CoreError::UnknownField(s.to_string()))
    }
}

/// The four suggestions produced by one generation call for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GeneratedPlan {
    pub category_name: String,
    pub needs: String,
    pub long_term_goal: String,
    pub short_term_goal: String,
    pub service_content: String,
}

impl GeneratedPlan {
    pub fn field(&self, field: PlanField) -> &str {
        match field {
            PlanField::Needs => &self.needs,
            PlanField::LongTermGoal => &self.long_term_goal,
            PlanField::ShortTermGoal => &self.short_term_goal,
            PlanField::ServiceContent => &self.service_content,
        }
    }
}

/// A row of the care-plan document (第2表).
///
/// `category_id` is `None` for rows produced by integrated generation; those
/// rows are not associated back to a catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CarePlanItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub category_name: String,
    pub needs: String,
    pub long_term_goal: String,
    pub short_term_goal: String,
    pub service_content: String,
}

impl CarePlanItem {
    /// Build a row from a generated plan, optionally tagged with its category.
    pub fn from_generated(category_id: Option<String>, plan: GeneratedPlan) -> Self {
        Self {
            category_id,
            category_name: plan.category_name,
            needs: plan.needs,
            long_term_goal: plan.long_term_goal,
            short_term_goal: plan.short_term_goal,
            service_content: plan.service_content,
        }
    }

    pub fn field(&self, field: PlanField) -> &str {
        match field {
            PlanField::Needs => &self.needs,
            PlanField::LongTermGoal => &self.long_term_goal,
            PlanField::ShortTermGoal => &self.short_term_goal,
            PlanField::ServiceContent => &self.service_content,
        }
    }

    pub fn set_field(&mut self, field: PlanField, value: String) {
        let slot = match field {
            PlanField::Needs => &mut self.needs,
            PlanField::LongTermGoal => &mut self.long_term_goal,
            PlanField::ShortTermGoal => &mut self.short_term_goal,
            PlanField::ServiceContent => &mut self.service_content,
        };
        *slot = value;
    }
}
