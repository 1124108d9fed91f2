use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StorageError;

/// Handle to a directory-backed key-value store.
///
/// Keys map to `<root>/<key>.json`. Keys are flat names: path separators and
/// dot-prefixed names are rejected.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| StorageError::Open {
            path: root.display().to_string(),
            source,
        })?;
        debug!(root = %root.display(), "opened local store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && !key.contains(['/', '\\'])
            && !key.contains("..");
        if !valid {
            return Err(StorageError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}
