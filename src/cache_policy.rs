//! What happens to the stored models once a prediction has been made.

use crate::store::ModelStore;
use log::{debug, info};

/// Lifetime of trained models after a prediction.
///
/// Models are fit for one coordinate and the seasonal model has no incremental
/// update, so the default throws them away and retrains on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Delete every model in the store after each prediction.
    #[default]
    AlwaysInvalidate,
    /// Leave the models in place, e.g. to inspect them afterwards. They are
    /// overwritten by the next training run.
    Retain,
}

impl CachePolicy {
    /// Applies the policy to `store`, returning the number of models deleted.
    pub fn apply(&self, store: &dyn ModelStore) -> usize {
        match self {
            CachePolicy::AlwaysInvalidate => invalidate(store),
            CachePolicy::Retain => {
                debug!("Keeping models in {}", store.location().display());
                0
            }
        }
    }
}

/// Removes every model from `store`. Deletion failures are logged, not returned.
pub fn invalidate(store: &dyn ModelStore) -> usize {
    let removed = store.clear_all();
    info!(
        "Invalidated {} model(s) in {}",
        removed,
        store.location().display()
    );
    removed
}
