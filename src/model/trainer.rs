use crate::error::ForecastError;
use crate::model::error::TrainingError;
use crate::model::seasonal::{SeasonalConfig, SeasonalModel};
use crate::store::ModelStore;
use crate::types::series::HistoricalSeries;
use crate::types::variable::Variable;
use bon::Builder;
use futures_util::future::join_all;
use log::{info, warn};
use std::sync::Arc;

/// What `train_all` does when one variable cannot be fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first variable that fails and return its error.
    #[default]
    AbortAll,
    /// Log the failure, leave that variable out, and train the rest.
    SkipAndContinue,
}

#[derive(Debug, Clone, Default, PartialEq, Builder)]
pub struct TrainingConfig {
    #[builder(default)]
    pub model: SeasonalConfig,
    #[builder(default)]
    pub failure_policy: FailurePolicy,
    /// Fit the variables on separate blocking workers instead of one after another.
    #[builder(default = false)]
    pub parallel: bool,
}

/// Which variables ended up with a stored model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainingReport {
    pub trained: Vec<Variable>,
    pub skipped: Vec<Variable>,
}

/// Fits one [`SeasonalModel`] per variable and saves each into a [`ModelStore`].
#[derive(Clone)]
pub struct Trainer {
    store: Arc<dyn ModelStore>,
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(store: Arc<dyn ModelStore>, config: TrainingConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Fits the model for a single variable without storing it.
    pub fn train_one(
        &self,
        series: &HistoricalSeries,
        variable: Variable,
    ) -> Result<SeasonalModel, TrainingError> {
        let config = variable.fit_config(&self.config.model);
        SeasonalModel::fit(variable, &series.column(variable), &config)
    }

    /// Trains and saves every variable in turn.
    ///
    /// Each model is saved as soon as it is fit, so earlier variables stay in the
    /// store when a later one fails.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::Training`] for a failed fit under
    /// [`FailurePolicy::AbortAll`], and [`ForecastError::Store`] if a model cannot
    /// be written regardless of policy.
    pub fn train_all(&self, series: &HistoricalSeries) -> Result<TrainingReport, ForecastError> {
        let mut report = TrainingReport::default();
        for variable in Variable::ALL {
            let outcome = self.train_and_save(series, variable);
            self.record(&mut report, variable, outcome)?;
        }
        Ok(report)
    }

    /// Like [`train_all`](Self::train_all), but fits all variables concurrently on
    /// blocking workers and waits for every one of them before returning.
    ///
    /// Under [`FailurePolicy::AbortAll`] all variables are still attempted; the
    /// error of the first failing variable (in [`Variable::ALL`] order) is returned.
    pub async fn train_all_parallel(
        &self,
        series: Arc<HistoricalSeries>,
    ) -> Result<TrainingReport, ForecastError> {
        let tasks = Variable::ALL.into_iter().map(|variable| {
            let trainer = self.clone();
            let series = Arc::clone(&series);
            tokio::task::spawn_blocking(move || {
                (variable, trainer.train_and_save(&series, variable))
            })
        });
        let outcomes = join_all(tasks).await;

        let mut report = TrainingReport::default();
        for outcome in outcomes {
            let (variable, result) = outcome?;
            self.record(&mut report, variable, result)?;
        }
        Ok(report)
    }

    fn train_and_save(
        &self,
        series: &HistoricalSeries,
        variable: Variable,
    ) -> Result<(), ForecastError> {
        let model = self.train_one(series, variable)?;
        self.store.save(variable, &model)?;
        info!(
            "Trained {} model on {} observations and saved it to {}",
            variable,
            model.n_observations(),
            self.store.location().display()
        );
        Ok(())
    }

    fn record(
        &self,
        report: &mut TrainingReport,
        variable: Variable,
        outcome: Result<(), ForecastError>,
    ) -> Result<(), ForecastError> {
        match outcome {
            Ok(()) => report.trained.push(variable),
            Err(ForecastError::Training(e))
                if self.config.failure_policy == FailurePolicy::SkipAndContinue =>
            {
                warn!("Skipping {}: {}", variable, e);
                report.skipped.push(variable);
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }
}
