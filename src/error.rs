use crate::historical::error::DataSourceError;
use crate::model::error::TrainingError;
use crate::predictor::PredictionStage;
use crate::store::error::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),

    #[error(transparent)]
    Training(#[from] TrainingError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid coordinate ({latitude}, {longitude}): latitude must be within [-90, 90] and longitude within [-180, 180]")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Invalid forecast date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String, #[source] chrono::ParseError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ForecastError {
    /// The pipeline stage this error is raised from, if it belongs to one.
    pub fn stage(&self) -> Option<PredictionStage> {
        match self {
            ForecastError::DataSource(_) => Some(PredictionStage::Fetching),
            ForecastError::Training(_) => Some(PredictionStage::Training),
            ForecastError::Store(
                StoreError::ModelNotFound { .. } | StoreError::Read(..) | StoreError::Decode(..),
            ) => Some(PredictionStage::Predicting),
            ForecastError::Store(StoreError::Delete(..)) => Some(PredictionStage::Invalidating),
            ForecastError::Store(_) => Some(PredictionStage::Training),
            ForecastError::InvalidCoordinate { .. }
            | ForecastError::InvalidDate(..)
            | ForecastError::TaskJoin(_) => None,
        }
    }
}
