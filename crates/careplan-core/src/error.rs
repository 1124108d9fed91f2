use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown plan field: {0}")]
    UnknownField(String),
}
