//! The main entry point: turn a place and a future date into a point forecast.
//!
//! Every prediction runs the full cycle: download the history for the
//! coordinate, fit one model per variable, evaluate each model at the target
//! date, then apply the [`CachePolicy`] to the stored models.

use crate::cache_policy::CachePolicy;
use crate::error::ForecastError;
use crate::historical::fetcher::{HistoricalFetcher, HistoricalWindow};
use crate::model::trainer::{Trainer, TrainingConfig};
use crate::store::ephemeral::EphemeralModelStore;
use crate::store::ModelStore;
use crate::types::coordinate::Coordinate;
use crate::types::forecast::{round2, ForecastResult};
use crate::types::series::HistoricalSeries;
use crate::types::variable::Variable;
use bon::{bon, Builder};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Step of a prediction cycle, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionStage {
    Fetching,
    Training,
    Predicting,
    Invalidating,
    Done,
}

impl fmt::Display for PredictionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PredictionStage::Fetching => "fetching",
            PredictionStage::Training => "training",
            PredictionStage::Predicting => "predicting",
            PredictionStage::Invalidating => "invalidating",
            PredictionStage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// Where a prediction keeps the models it trains.
#[derive(Clone, Default)]
pub enum StoreScope {
    /// A fresh temporary store per prediction. Concurrent predictions are independent.
    #[default]
    PerRequest,
    /// One store for every prediction. Each cycle holds the store's
    /// [`cycle_lock`](ModelStore::cycle_lock), so predictions on the same models
    /// run one at a time, even across predictors.
    Shared(Arc<dyn ModelStore>),
}

#[derive(Debug, Clone, Default, PartialEq, Builder)]
pub struct PredictorConfig {
    /// History the models are trained on.
    #[builder(default)]
    pub window: HistoricalWindow,
    #[builder(default)]
    pub training: TrainingConfig,
    #[builder(default)]
    pub cache_policy: CachePolicy,
}

/// Fetches history, trains the per-variable models, and forecasts a date.
///
/// # Examples
///
/// ```no_run
/// # use will_it_rain::{Predictor, ForecastError};
/// # #[tokio::main]
/// # async fn main() -> Result<(), ForecastError> {
/// let predictor = Predictor::builder().build()?;
/// let forecast = predictor.predict_iso("2025-10-01", -23.51, -47.45).await?;
/// println!("{}", serde_json::to_string_pretty(&forecast).unwrap());
/// # Ok(())
/// # }
/// ```
pub struct Predictor {
    fetcher: HistoricalFetcher,
    config: PredictorConfig,
    scope: StoreScope,
}

#[bon]
impl Predictor {
    /// Creates a predictor.
    ///
    /// * `.base_url(..)`: Optional. Root of the NASA POWER service.
    /// * `.timeout(..)`: Optional. Timeout of the history download.
    /// * `.config(..)`: Optional. Window, training and cache settings ([`PredictorConfig`]).
    /// * `.store(..)`: Optional. A shared [`ModelStore`]. Without it every
    ///   prediction trains into its own temporary store.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::DataSource`] if the HTTP client cannot be built.
    #[builder]
    pub fn new(
        #[builder(into)] base_url: Option<String>,
        timeout: Option<Duration>,
        config: Option<PredictorConfig>,
        store: Option<Arc<dyn ModelStore>>,
    ) -> Result<Self, ForecastError> {
        let fetcher = HistoricalFetcher::builder()
            .maybe_base_url(base_url)
            .maybe_timeout(timeout)
            .build()?;
        Ok(Self {
            fetcher,
            config: config.unwrap_or_default(),
            scope: store.map(StoreScope::Shared).unwrap_or_default(),
        })
    }

    /// Forecasts every variable at `location` on `date`, builder style.
    ///
    /// ```no_run
    /// # use will_it_rain::{Coordinate, Predictor, ForecastError};
    /// # use chrono::NaiveDate;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), ForecastError> {
    /// let predictor = Predictor::builder().build()?;
    /// let forecast = predictor
    ///     .forecast()
    ///     .date(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
    ///     .location(Coordinate::new(52.52, 13.40)?)
    ///     .call()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn forecast(
        &self,
        date: NaiveDate,
        location: Coordinate,
    ) -> Result<ForecastResult, ForecastError> {
        self.predict_at(date, location).await
    }
}

impl Predictor {
    /// Forecasts every variable at (`latitude`, `longitude`) on `target_date`.
    ///
    /// # Errors
    ///
    /// * [`ForecastError::InvalidCoordinate`] for an out-of-range coordinate.
    /// * [`ForecastError::DataSource`] if the history download fails.
    /// * [`ForecastError::Training`] if a variable cannot be fit under
    ///   [`FailurePolicy::AbortAll`](crate::FailurePolicy::AbortAll).
    /// * [`ForecastError::Store`] if a model cannot be written or read back.
    pub async fn predict(
        &self,
        target_date: NaiveDate,
        latitude: f64,
        longitude: f64,
    ) -> Result<ForecastResult, ForecastError> {
        let coordinate = Coordinate::new(latitude, longitude)?;
        self.predict_at(target_date, coordinate).await
    }

    /// Same as [`predict`](Self::predict) with the date given as `YYYY-MM-DD`
    /// (a trailing `THH:MM:SS` is accepted and ignored).
    pub async fn predict_iso(
        &self,
        target_date: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<ForecastResult, ForecastError> {
        let date = parse_forecast_date(target_date)?;
        self.predict(date, latitude, longitude).await
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    async fn predict_at(
        &self,
        date: NaiveDate,
        coordinate: Coordinate,
    ) -> Result<ForecastResult, ForecastError> {
        let result = match &self.scope {
            StoreScope::Shared(store) => {
                let lock = store.cycle_lock();
                let _guard = lock.lock().await;
                self.run_cycle(date, coordinate, Arc::clone(store)).await
            }
            StoreScope::PerRequest => {
                let store: Arc<dyn ModelStore> = Arc::new(EphemeralModelStore::new()?);
                self.run_cycle(date, coordinate, store).await
            }
        };
        if let Err(e) = &result {
            match e.stage() {
                Some(stage) => warn!("Prediction failed while {}: {}", stage, e),
                None => warn!("Prediction failed: {}", e),
            }
        }
        result
    }

    async fn run_cycle(
        &self,
        date: NaiveDate,
        coordinate: Coordinate,
        store: Arc<dyn ModelStore>,
    ) -> Result<ForecastResult, ForecastError> {
        info!(
            "[{}] History for ({}, {})",
            PredictionStage::Fetching,
            coordinate.latitude(),
            coordinate.longitude()
        );
        let series = self
            .fetcher
            .fetch_window(coordinate, &self.config.window)
            .await?;

        let predictions = self.train_and_predict(date, series, Arc::clone(&store)).await;

        // Runs whether or not training and prediction succeeded.
        info!("[{}] {:?}", PredictionStage::Invalidating, self.config.cache_policy);
        let policy = self.config.cache_policy;
        let cleanup = tokio::task::spawn_blocking(move || policy.apply(store.as_ref())).await;
        if let Err(e) = cleanup {
            warn!("Model cleanup did not complete: {}", e);
        }

        let predictions = predictions?;
        info!(
            "[{}] Forecast for {} with {} variable(s)",
            PredictionStage::Done,
            date,
            predictions.len()
        );
        Ok(ForecastResult::new(date, coordinate, predictions))
    }

    async fn train_and_predict(
        &self,
        date: NaiveDate,
        series: HistoricalSeries,
        store: Arc<dyn ModelStore>,
    ) -> Result<BTreeMap<Variable, f64>, ForecastError> {
        info!("[{}] {} daily records", PredictionStage::Training, series.len());
        let trainer = Trainer::new(Arc::clone(&store), self.config.training.clone());
        let report = if self.config.training.parallel {
            trainer.train_all_parallel(Arc::new(series)).await?
        } else {
            tokio::task::spawn_blocking(move || trainer.train_all(&series)).await??
        };

        info!("[{}] {}", PredictionStage::Predicting, date);
        let trained = report.trained;
        tokio::task::spawn_blocking(move || predict_variables(store.as_ref(), &trained, date))
            .await?
    }
}

fn predict_variables(
    store: &dyn ModelStore,
    variables: &[Variable],
    date: NaiveDate,
) -> Result<BTreeMap<Variable, f64>, ForecastError> {
    let mut predictions = BTreeMap::new();
    for &variable in variables {
        let model = store.load(variable)?;
        let value = round2(model.predict(date));
        debug!("{} = {}", variable.predicted_key(), value);
        predictions.insert(variable, value);
    }
    Ok(predictions)
}

fn parse_forecast_date(input: &str) -> Result<NaiveDate, ForecastError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|e| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
                .map(|dt| dt.date())
                .map_err(|_| e)
        })
        .map_err(|e| ForecastError::InvalidDate(input.to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        assert_eq!(parse_forecast_date("2025-10-01").unwrap(), expected);
        assert_eq!(parse_forecast_date(" 2025-10-01 ").unwrap(), expected);
        assert_eq!(parse_forecast_date("2025-10-01T08:30:00").unwrap(), expected);
    }

    #[test]
    fn rejects_other_date_formats() {
        assert!(matches!(
            parse_forecast_date("01/10/2025"),
            Err(ForecastError::InvalidDate(input, _)) if input == "01/10/2025"
        ));
        assert!(parse_forecast_date("2025-02-30").is_err());
    }

    #[test]
    fn stages_display_lowercase() {
        assert_eq!(PredictionStage::Invalidating.to_string(), "invalidating");
    }

    #[test]
    fn defaults_use_request_scoped_store_and_invalidation() {
        let predictor = Predictor::builder().build().unwrap();
        assert!(matches!(predictor.scope, StoreScope::PerRequest));
        assert_eq!(predictor.config().cache_policy, CachePolicy::AlwaysInvalidate);
        assert_eq!(predictor.config().window, HistoricalWindow::default());
    }

    #[tokio::test]
    async fn invalid_coordinate_fails_before_any_request() {
        let predictor = Predictor::builder()
            .base_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(matches!(
            predictor.predict(date, 120.0, 0.0).await,
            Err(ForecastError::InvalidCoordinate { .. })
        ));
    }
}
