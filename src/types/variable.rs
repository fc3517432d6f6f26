//! The closed set of climate variables tracked by the pipeline.

use crate::model::seasonal::SeasonalConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the eight daily climate quantities that get their own model.
///
/// The set is fixed: training and prediction both iterate [`Variable::ALL`], and
/// every per-variable lookup is an exhaustive `match`, so adding a variable here
/// forces every stage of the pipeline to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Variable {
    /// Mean air temperature at 2 m (°C).
    Temperature,
    /// Maximum air temperature at 2 m (°C).
    TemperatureMax,
    /// Minimum air temperature at 2 m (°C).
    TemperatureMin,
    /// Bias-corrected total precipitation (mm/day).
    Precipitation,
    /// Snow precipitation over land (mm/day).
    SnowPrecipitation,
    /// Relative humidity at 2 m (%).
    Humidity,
    /// All-sky surface UV index.
    UvIndex,
    /// Wind speed at 50 m (m/s).
    WindSpeed,
}

impl Variable {
    pub const COUNT: usize = 8;

    pub const ALL: [Variable; Variable::COUNT] = [
        Variable::Temperature,
        Variable::TemperatureMax,
        Variable::TemperatureMin,
        Variable::Precipitation,
        Variable::SnowPrecipitation,
        Variable::Humidity,
        Variable::UvIndex,
        Variable::WindSpeed,
    ];

    /// Stable key used for model file names and result fields.
    pub fn key(&self) -> &'static str {
        match self {
            Variable::Temperature => "temperatura",
            Variable::TemperatureMax => "temperatura_max",
            Variable::TemperatureMin => "temperatura_min",
            Variable::Precipitation => "precipitacao",
            Variable::SnowPrecipitation => "precipitacao_neve",
            Variable::Humidity => "umidade",
            Variable::UvIndex => "uv",
            Variable::WindSpeed => "vento",
        }
    }

    /// Field name of this variable's point estimate in a forecast result.
    pub fn predicted_key(&self) -> String {
        format!("{}_previsto", self.key())
    }

    /// NASA POWER parameter codes carrying this variable, most preferred first.
    ///
    /// Only the first code is requested; the others are accepted when reading a
    /// response, since older datasets publish precipitation as `PRECTOT`.
    pub fn power_codes(&self) -> &'static [&'static str] {
        match self {
            Variable::Temperature => &["T2M"],
            Variable::TemperatureMax => &["T2M_MAX"],
            Variable::TemperatureMin => &["T2M_MIN"],
            Variable::Precipitation => &["PRECTOTCORR", "PRECTOT"],
            Variable::SnowPrecipitation => &["PRECSNOLAND"],
            Variable::Humidity => &["RH2M"],
            Variable::UvIndex => &["ALLSKY_SFC_UV_INDEX"],
            Variable::WindSpeed => &["WS50M"],
        }
    }

    pub fn request_code(&self) -> &'static str {
        self.power_codes()[0]
    }

    /// Fitting configuration for this variable, derived from a base configuration.
    ///
    /// Every variable currently shares the base settings (yearly seasonality on,
    /// daily off); the match keeps the mapping exhaustive.
    pub fn fit_config(&self, base: &SeasonalConfig) -> SeasonalConfig {
        match self {
            Variable::Temperature
            | Variable::TemperatureMax
            | Variable::TemperatureMin
            | Variable::Precipitation
            | Variable::SnowPrecipitation
            | Variable::Humidity
            | Variable::UvIndex
            | Variable::WindSpeed => base.clone(),
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Variable::Temperature => 0,
            Variable::TemperatureMax => 1,
            Variable::TemperatureMin => 2,
            Variable::Precipitation => 3,
            Variable::SnowPrecipitation => 4,
            Variable::Humidity => 5,
            Variable::UvIndex => 6,
            Variable::WindSpeed => 7,
        }
    }

    /// Looks a variable up by its [`key`](Variable::key).
    pub fn from_key(key: &str) -> Option<Variable> {
        Variable::ALL.into_iter().find(|v| v.key() == key)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
