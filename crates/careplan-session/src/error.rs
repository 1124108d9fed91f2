use thiserror::Error;
use uuid::Uuid;

use careplan_core::error::CoreError;
use careplan_export::error::ExportError;
use careplan_generate::error::GenerateError;
use careplan_storage::error::StorageError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("no assessment items are checked for {category}")]
    NoCheckedItems { category: String },

    #[error("no category has a checked assessment item")]
    NoCheckedCategories,

    #[error("no Gemini API key configured; run `careplan settings set-api-key <KEY>`")]
    MissingCredential,

    #[error("only one category is checked; acknowledge the warning to run integrated generation")]
    WarningNotAcknowledged,

    #[error("no patient selected")]
    NoPatientSelected,

    #[error("unknown patient: {0}")]
    UnknownPatient(Uuid),

    #[error("no plan items")]
    NoPlanItems,

    #[error("no action awaiting confirmation")]
    NothingPending,

    #[error("item {index} out of range ({len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Core(CoreError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl From<CoreError> for SessionError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownCategory(id) => SessionError::UnknownCategory(id),
            other => SessionError::Core(other),
        }
    }
}
