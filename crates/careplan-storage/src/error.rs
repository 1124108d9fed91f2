use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("invalid key: {key:?}")]
    InvalidKey { key: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("read error for {key}: {source}")]
    GetObject {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("write error for {key}: {source}")]
    PutObject {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open store at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
