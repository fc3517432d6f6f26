use crate::model::seasonal::SeasonalModel;
use crate::store::error::StoreError;
use crate::store::ModelStore;
use crate::types::variable::Variable;
use crate::utils::{ensure_dir_exists, get_store_dir};
use bincode::config::{Configuration, Fixint, LittleEndian};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, PoisonError, Weak};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

const MODEL_FILE_PREFIX: &str = "model_";
const MODEL_FILE_EXTENSION: &str = "bin";
const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

/// Cycle locks of the model directories in use, keyed by absolute path.
static DIRECTORY_LOCKS: LazyLock<std::sync::Mutex<HashMap<PathBuf, Weak<Mutex<()>>>>> =
    LazyLock::new(|| std::sync::Mutex::new(HashMap::new()));

/// The cycle lock for `dir`, shared by every store in the process that points at it.
///
/// Paths are made absolute but symlinks are not resolved, so two spellings of
/// one directory through a symlink get separate locks.
fn directory_lock(dir: &Path) -> Arc<Mutex<()>> {
    let key = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());
    let mut locks = DIRECTORY_LOCKS
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(lock) = locks.get(&key).and_then(Weak::upgrade) {
        return lock;
    }
    locks.retain(|_, lock| lock.strong_count() > 0);
    let lock = Arc::new(Mutex::new(()));
    locks.insert(key, Arc::downgrade(&lock));
    lock
}

/// Stores each model as `model_<key>.bin` in one directory.
///
/// The directory is created on the first save. Several stores may point at the
/// same directory; they then share (and clear) the same models, and share one
/// [`cycle_lock`](ModelStore::cycle_lock).
#[derive(Debug, Clone)]
pub struct DirectoryModelStore {
    dir: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl DirectoryModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let lock = directory_lock(&dir);
        Self { dir, lock }
    }

    /// A store in the user's cache directory (e.g. `~/.cache/will_it_rain_models`).
    pub fn with_default_location() -> Result<Self, StoreError> {
        Ok(Self::new(get_store_dir()?))
    }

    pub fn model_path(&self, variable: Variable) -> PathBuf {
        self.dir.join(format!(
            "{}{}.{}",
            MODEL_FILE_PREFIX,
            variable.key(),
            MODEL_FILE_EXTENSION
        ))
    }

    fn is_model_file(path: &Path) -> bool {
        let has_prefix = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(MODEL_FILE_PREFIX));
        let has_extension = path
            .extension()
            .is_some_and(|ext| ext == MODEL_FILE_EXTENSION);
        has_prefix && has_extension && path.is_file()
    }
}

impl ModelStore for DirectoryModelStore {
    fn save(&self, variable: Variable, model: &SeasonalModel) -> Result<(), StoreError> {
        if model.variable() != variable {
            return Err(StoreError::VariableMismatch {
                expected: variable,
                found: model.variable(),
            });
        }
        ensure_dir_exists(&self.dir)
            .map_err(|e| StoreError::DirCreation(self.dir.clone(), e))?;

        let path = self.model_path(variable);
        let bytes = bincode::serde::encode_to_vec(model, BINCODE_CONFIG)
            .map_err(|e| StoreError::Encode(variable, Box::new(e)))?;

        // Write next to the target and rename over it, so a concurrent load never
        // sees a partially written file.
        let mut temp_file =
            NamedTempFile::new_in(&self.dir).map_err(|e| StoreError::Write(path.clone(), e))?;
        temp_file
            .write_all(&bytes)
            .map_err(|e| StoreError::Write(path.clone(), e))?;
        temp_file
            .flush()
            .map_err(|e| StoreError::Write(path.clone(), e))?;
        temp_file
            .persist(&path)
            .map_err(|e| StoreError::Write(path.clone(), e.error))?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    fn load(&self, variable: Variable) -> Result<SeasonalModel, StoreError> {
        let path = self.model_path(variable);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::ModelNotFound { variable, path });
            }
            Err(e) => return Err(StoreError::Read(path, e)),
        };
        let (model, _) =
            bincode::serde::decode_from_slice::<SeasonalModel, _>(&bytes, BINCODE_CONFIG)
                .map_err(|e| StoreError::Decode(path.clone(), Box::new(e)))?;
        if model.variable() != variable {
            return Err(StoreError::VariableMismatch {
                expected: variable,
                found: model.variable(),
            });
        }
        Ok(model)
    }

    fn exists(&self, variable: Variable) -> bool {
        self.model_path(variable).is_file()
    }

    fn remove(&self, variable: Variable) -> Result<bool, StoreError> {
        let path = self.model_path(variable);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Delete(path, e)),
        }
    }

    fn clear_all(&self) -> usize {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Model directory {} does not exist", self.dir.display());
                return 0;
            }
            Err(e) => {
                warn!(
                    "Failed to list model directory {}: {}",
                    self.dir.display(),
                    e
                );
                return 0;
            }
        };

        let mut removed = 0;
        for path in entries.filter_map(|entry| entry.ok().map(|e| e.path())) {
            if !Self::is_model_file(&path) {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Removed model {}", path.display());
                    removed += 1;
                }
                Err(e) => warn!("Failed to remove model {}: {}", path.display(), e),
            }
        }
        info!(
            "Model cleanup finished, removed {} file(s) from {}",
            removed,
            self.dir.display()
        );
        removed
    }

    fn location(&self) -> &Path {
        &self.dir
    }

    fn cycle_lock(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.lock)
    }
}
