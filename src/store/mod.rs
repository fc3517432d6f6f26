//! Persistence of fitted models, keyed by [`Variable`].

pub mod directory;
pub mod ephemeral;
pub mod error;

use crate::model::seasonal::SeasonalModel;
use crate::store::error::StoreError;
use crate::types::variable::Variable;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A `Variable -> SeasonalModel` mapping that outlives a single function call.
///
/// Holds at most one model per variable. Implementations must make `save`
/// atomic with respect to `load`.
pub trait ModelStore: Send + Sync {
    /// Stores `model` under `variable`, replacing any earlier model.
    fn save(&self, variable: Variable, model: &SeasonalModel) -> Result<(), StoreError>;

    /// Fails with [`StoreError::ModelNotFound`] if nothing is stored for `variable`.
    fn load(&self, variable: Variable) -> Result<SeasonalModel, StoreError>;

    fn exists(&self, variable: Variable) -> bool;

    /// Deletes the model for `variable`. Returns whether there was one.
    fn remove(&self, variable: Variable) -> Result<bool, StoreError>;

    /// Deletes every stored model and returns how many were removed.
    ///
    /// Best effort: a model that cannot be deleted is logged and skipped.
    fn clear_all(&self) -> usize;

    fn location(&self) -> &Path;

    /// Lock held for a whole train, predict and invalidate cycle.
    ///
    /// Every store backed by the same models must return the same lock, so that
    /// one cycle's invalidation cannot remove models another cycle is reading.
    fn cycle_lock(&self) -> Arc<Mutex<()>>;
}
