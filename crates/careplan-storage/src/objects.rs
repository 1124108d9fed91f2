use tracing::debug;

use crate::client::LocalStore;
use crate::error::StorageError;

/// Result of a GET operation.
pub struct GetObjectOutput {
    pub body: Vec<u8>,
}

/// Read an object from the store.
pub fn get_object(store: &LocalStore, key: &str) -> Result<GetObjectOutput, StorageError> {
    let path = store.path_for(key)?;
    let body = std::fs::read(&path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound {
                key: key.to_string(),
            }
        } else {
            StorageError::GetObject {
                key: key.to_string(),
                source,
            }
        }
    })?;

    Ok(GetObjectOutput { body })
}

/// Replace an object in the store.
///
/// The body is written to a temp file and renamed over the target, so a
/// reader never observes a half-written document.
pub fn put_object(store: &LocalStore, key: &str, body: &[u8]) -> Result<(), StorageError> {
    let path = store.path_for(key)?;
    let tmp_path = path.with_extension("json.tmp");
    let put_err = |source| StorageError::PutObject {
        key: key.to_string(),
        source,
    };

    std::fs::write(&tmp_path, body).map_err(put_err)?;
    std::fs::rename(&tmp_path, &path).map_err(put_err)?;

    debug!(key, bytes = body.len(), "object written");
    Ok(())
}
