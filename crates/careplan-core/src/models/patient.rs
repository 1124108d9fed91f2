use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// A care recipient. Created once at registration and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    /// e.g. `要介護3`.
    #[serde(default)]
    pub care_level: Option<String>,
    pub created_at: jiff::Timestamp,
}

impl Patient {
    /// Register a new patient with a fresh ID.
    ///
    /// A blank care level is stored as `None`.
    pub fn register(name: impl Into<String>, age: Option<u32>, care_level: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            age,
            care_level: care_level.filter(|c| !c.trim().is_empty()),
            created_at: jiff::Timestamp::now(),
        }
    }

    /// One-line summary such as `82歳 要介護2`.
    pub fn summary(&self) -> String {
        let age = self.age.map(|a| format!("{a}歳")).unwrap_or_default();
        let level = self.care_level.as_deref().unwrap_or_default();
        format!("{age} {level}").trim().to_string()
    }
}
