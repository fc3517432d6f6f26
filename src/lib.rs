//! Long-range point forecasts from daily climate history.
//!
//! For a coordinate and a date, [`Predictor`] downloads the NASA POWER daily
//! record, fits one seasonal model per [`Variable`], and reports each model's
//! value on that date.
//!
//! ```no_run
//! use will_it_rain::{ForecastError, Predictor};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), ForecastError> {
//! let predictor = Predictor::builder().build()?;
//! let forecast = predictor.predict_iso("2025-10-01", -23.51, -47.45).await?;
//! for (variable, value) in forecast.predictions() {
//!     println!("{}: {}", variable.predicted_key(), value);
//! }
//! # Ok(())
//! # }
//! ```
mod cache_policy;
mod error;
mod historical;
mod model;
mod predictor;
mod store;
mod types;
mod utils;

pub use error::ForecastError;
pub use predictor::*;

pub use cache_policy::{invalidate, CachePolicy};

pub use historical::fetcher::*;
pub use model::seasonal::{SeasonalConfig, SeasonalModel};
pub use model::trainer::*;
pub use store::directory::DirectoryModelStore;
pub use store::ephemeral::EphemeralModelStore;
pub use store::ModelStore;

pub use types::coordinate::Coordinate;
pub use types::forecast::ForecastResult;
pub use types::series::{HistoricalSeries, Observation};
pub use types::variable::Variable;

pub use historical::error::DataSourceError;
pub use model::error::TrainingError;
pub use store::error::StoreError;
