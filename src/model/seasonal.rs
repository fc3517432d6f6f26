//! Additive trend + Fourier seasonality model, one per climate variable.
//!
//! The forecast is `trend(t) + Σ seasonal(t)`, where the trend is piecewise
//! linear with candidate changepoints spread over the early part of the history,
//! and each seasonality is a truncated Fourier series of a fixed period. All
//! coefficients are found jointly by penalised least squares; changepoint
//! offsets are shrunk hard, seasonal terms only lightly.

use crate::model::error::TrainingError;
use crate::model::linalg::ridge_solve;
use crate::types::variable::Variable;
use bon::Builder;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const YEAR_DAYS: f64 = 365.25;
const WEEK_DAYS: f64 = 7.0;
const DAY_DAYS: f64 = 1.0;
/// Keeps the unpenalised trend terms well conditioned.
const TREND_JITTER: f64 = 1e-9;

/// Hyperparameters for [`SeasonalModel::fit`].
///
/// The defaults fit daily climate data: yearly seasonality on, weekly on with a
/// low order, daily off since there is one reading per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct SeasonalConfig {
    #[builder(default = true)]
    pub yearly_seasonality: bool,
    #[builder(default = 10)]
    pub yearly_order: usize,
    #[builder(default = true)]
    pub weekly_seasonality: bool,
    #[builder(default = 3)]
    pub weekly_order: usize,
    #[builder(default = false)]
    pub daily_seasonality: bool,
    #[builder(default = 4)]
    pub daily_order: usize,
    /// Number of potential trend changepoints.
    #[builder(default = 25)]
    pub n_changepoints: usize,
    /// Fraction of the history in which changepoints may be placed.
    #[builder(default = 0.8)]
    pub changepoint_range: f64,
    /// Smaller values make the trend stiffer.
    #[builder(default = 0.05)]
    pub changepoint_prior_scale: f64,
    #[builder(default = 10.0)]
    pub seasonality_prior_scale: f64,
    /// Minimum number of non-missing observations required to fit.
    #[builder(default = 2)]
    pub min_observations: usize,
}

impl Default for SeasonalConfig {
    fn default() -> Self {
        SeasonalConfig::builder().build()
    }
}

impl SeasonalConfig {
    fn seasonalities(&self) -> Vec<Seasonality> {
        let mut seasonalities = Vec::new();
        if self.yearly_seasonality && self.yearly_order > 0 {
            seasonalities.push(Seasonality {
                period: YEAR_DAYS,
                order: self.yearly_order,
            });
        }
        if self.weekly_seasonality && self.weekly_order > 0 {
            seasonalities.push(Seasonality {
                period: WEEK_DAYS,
                order: self.weekly_order,
            });
        }
        if self.daily_seasonality && self.daily_order > 0 {
            seasonalities.push(Seasonality {
                period: DAY_DAYS,
                order: self.daily_order,
            });
        }
        seasonalities
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Seasonality {
    period: f64,
    order: usize,
}

/// A fitted model for a single [`Variable`].
///
/// Immutable once fit. Coefficients are laid out as
/// `[offset, slope, changepoint deltas.., seasonal sin/cos pairs..]` over a
/// time axis scaled to `[0, 1]` across the training history and a target
/// scaled by its largest magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalModel {
    variable: Variable,
    config: SeasonalConfig,
    trained_from: NaiveDate,
    trained_to: NaiveDate,
    n_observations: usize,
    origin_day: i64,
    span_days: f64,
    y_scale: f64,
    changepoints: Vec<f64>,
    seasonalities: Vec<Seasonality>,
    coefficients: Vec<f64>,
}

impl SeasonalModel {
    /// Fits a model to the `(date, value)` sub-series of `variable`.
    ///
    /// Days without a value are skipped. The series does not need to be sorted.
    ///
    /// # Errors
    ///
    /// * [`TrainingError::NoObservations`] if every value is missing.
    /// * [`TrainingError::InsufficientData`] if fewer than
    ///   `config.min_observations` values (or fewer than two distinct days) remain.
    /// * [`TrainingError::Singular`] if the penalised system cannot be solved.
    pub fn fit(
        variable: Variable,
        series: &[(NaiveDate, Option<f64>)],
        config: &SeasonalConfig,
    ) -> Result<Self, TrainingError> {
        let mut observed: Vec<(NaiveDate, f64)> = series
            .iter()
            .filter_map(|(date, value)| value.filter(|v| v.is_finite()).map(|v| (*date, v)))
            .collect();
        if observed.is_empty() {
            return Err(TrainingError::NoObservations(variable));
        }
        let required = config.min_observations.max(2);
        if observed.len() < required {
            return Err(TrainingError::InsufficientData {
                variable,
                found: observed.len(),
                required,
            });
        }
        observed.sort_by_key(|(date, _)| *date);

        let trained_from = observed[0].0;
        let trained_to = observed[observed.len() - 1].0;
        let origin_day = day_number(trained_from);
        let span_days = (day_number(trained_to) - origin_day) as f64;
        if span_days <= 0.0 {
            return Err(TrainingError::InsufficientData {
                variable,
                found: 1,
                required,
            });
        }

        let y_scale = observed
            .iter()
            .map(|(_, v)| v.abs())
            .fold(0.0, f64::max);
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };

        let scaled_t: Vec<f64> = observed
            .iter()
            .map(|(date, _)| (day_number(*date) - origin_day) as f64 / span_days)
            .collect();
        let changepoints = place_changepoints(&scaled_t, config);
        let seasonalities = config.seasonalities();

        let mut model = SeasonalModel {
            variable,
            config: config.clone(),
            trained_from,
            trained_to,
            n_observations: observed.len(),
            origin_day,
            span_days,
            y_scale,
            changepoints,
            seasonalities,
            coefficients: Vec::new(),
        };

        let rows: Vec<Vec<f64>> = observed
            .iter()
            .map(|(date, _)| model.design_row(*date))
            .collect();
        let targets: Vec<f64> = observed.iter().map(|(_, v)| v / y_scale).collect();
        let penalty = model.penalty();

        model.coefficients =
            ridge_solve(&rows, &targets, &penalty).ok_or(TrainingError::Singular(variable))?;
        Ok(model)
    }

    /// Point estimate for `date`.
    pub fn predict(&self, date: NaiveDate) -> f64 {
        let row = self.design_row(date);
        let scaled: f64 = row
            .iter()
            .zip(&self.coefficients)
            .map(|(x, beta)| x * beta)
            .sum();
        scaled * self.y_scale
    }

    pub fn predict_many(&self, dates: &[NaiveDate]) -> Vec<f64> {
        dates.iter().map(|date| self.predict(*date)).collect()
    }

    pub fn variable(&self) -> Variable {
        self.variable
    }

    pub fn config(&self) -> &SeasonalConfig {
        &self.config
    }

    /// First and last dates with a value in the training data.
    pub fn trained_range(&self) -> (NaiveDate, NaiveDate) {
        (self.trained_from, self.trained_to)
    }

    pub fn n_observations(&self) -> usize {
        self.n_observations
    }

    fn design_row(&self, date: NaiveDate) -> Vec<f64> {
        let day = day_number(date);
        let t = (day - self.origin_day) as f64 / self.span_days;
        let n_seasonal: usize = self.seasonalities.iter().map(|s| 2 * s.order).sum();
        let mut row = Vec::with_capacity(2 + self.changepoints.len() + n_seasonal);

        row.push(1.0);
        row.push(t);
        row.extend(self.changepoints.iter().map(|c| (t - c).max(0.0)));
        for seasonality in &self.seasonalities {
            let phase = 2.0 * PI * day as f64 / seasonality.period;
            for k in 1..=seasonality.order {
                let angle = phase * k as f64;
                row.push(angle.sin());
                row.push(angle.cos());
            }
        }
        row
    }

    fn penalty(&self) -> Vec<f64> {
        let changepoint = 1.0 / self.config.changepoint_prior_scale.powi(2);
        let seasonal = 1.0 / self.config.seasonality_prior_scale.powi(2);
        let n_seasonal: usize = self.seasonalities.iter().map(|s| 2 * s.order).sum();

        let mut penalty = vec![TREND_JITTER, TREND_JITTER];
        penalty.extend(std::iter::repeat(changepoint).take(self.changepoints.len()));
        penalty.extend(std::iter::repeat(seasonal).take(n_seasonal));
        penalty
    }
}

/// Days since 1970-01-01.
fn day_number(date: NaiveDate) -> i64 {
    date.signed_duration_since(NaiveDate::default()).num_days()
}

/// Evenly spaced changepoints over the first `changepoint_range` of the
/// observations, expressed on the scaled time axis.
fn place_changepoints(scaled_t: &[f64], config: &SeasonalConfig) -> Vec<f64> {
    let history = (scaled_t.len() as f64 * config.changepoint_range.clamp(0.0, 1.0)).floor() as usize;
    let count = config.n_changepoints.min(history.saturating_sub(1));
    if count == 0 {
        return Vec::new();
    }
    let last = (history - 1) as f64;
    let mut changepoints: Vec<f64> = (1..=count)
        .map(|i| {
            let index = (i as f64 * last / count as f64).round() as usize;
            scaled_t[index]
        })
        .filter(|t| *t > 0.0)
        .collect();
    changepoints.dedup();
    changepoints
}
