use crate::model::seasonal::SeasonalModel;
use crate::store::directory::DirectoryModelStore;
use crate::store::error::StoreError;
use crate::store::ModelStore;
use crate::types::variable::Variable;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;

const TEMP_DIR_PREFIX: &str = "will_it_rain-";

/// A model store in a fresh temporary directory, deleted when the store is dropped.
///
/// Each prediction gets its own instance, so concurrent requests never see or
/// clear each other's models.
#[derive(Debug)]
pub struct EphemeralModelStore {
    inner: DirectoryModelStore,
    // Dropped last; removes the directory.
    _dir: TempDir,
}

impl EphemeralModelStore {
    pub fn new() -> Result<Self, StoreError> {
        let dir = tempfile::Builder::new()
            .prefix(TEMP_DIR_PREFIX)
            .tempdir()
            .map_err(|e| StoreError::DirCreation(std::env::temp_dir(), e))?;
        Ok(Self {
            inner: DirectoryModelStore::new(dir.path()),
            _dir: dir,
        })
    }
}

impl ModelStore for EphemeralModelStore {
    fn save(&self, variable: Variable, model: &SeasonalModel) -> Result<(), StoreError> {
        self.inner.save(variable, model)
    }

    fn load(&self, variable: Variable) -> Result<SeasonalModel, StoreError> {
        self.inner.load(variable)
    }

    fn exists(&self, variable: Variable) -> bool {
        self.inner.exists(variable)
    }

    fn remove(&self, variable: Variable) -> Result<bool, StoreError> {
        self.inner.remove(variable)
    }

    fn clear_all(&self) -> usize {
        self.inner.clear_all()
    }

    fn location(&self) -> &Path {
        self.inner.location()
    }

    fn cycle_lock(&self) -> Arc<Mutex<()>> {
        self.inner.cycle_lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instances_do_not_share_a_directory() {
        let a = EphemeralModelStore::new().unwrap();
        let b = EphemeralModelStore::new().unwrap();
        assert_ne!(a.location(), b.location());
    }

    #[test]
    fn directory_is_removed_on_drop() {
        let store = EphemeralModelStore::new().unwrap();
        let location = store.location().to_path_buf();
        assert!(location.is_dir());

        drop(store);
        assert!(!location.exists());
    }
}
