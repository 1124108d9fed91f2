use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    /// The API answered with a non-2xx status.
    #[error("generation API error: {message}")]
    Http { status: u16, message: String },

    #[error("generation API request failed: {0}")]
    Transport(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
