use crate::types::coordinate::Coordinate;
use crate::types::variable::Variable;
use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// Point forecast of every trained variable for one place and day.
///
/// Serializes to the flat mapping the HTTP layer returns and the summarizer
/// reads:
///
/// ```json
/// {"data": "2025-10-01", "latitude": -23.51, "longitude": -47.45,
///  "temperatura_previsto": 21.37, "umidade_previsto": 74.02, ...}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    pub date: NaiveDate,
    pub coordinate: Coordinate,
    predictions: BTreeMap<Variable, f64>,
}

impl ForecastResult {
    pub(crate) fn new(
        date: NaiveDate,
        coordinate: Coordinate,
        predictions: BTreeMap<Variable, f64>,
    ) -> Self {
        Self {
            date,
            coordinate,
            predictions,
        }
    }

    /// Predicted value for `variable`, if it was trained in this cycle.
    pub fn get(&self, variable: Variable) -> Option<f64> {
        self.predictions.get(&variable).copied()
    }

    pub fn predictions(&self) -> &BTreeMap<Variable, f64> {
        &self.predictions
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

impl Serialize for ForecastResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3 + self.predictions.len()))?;
        map.serialize_entry("data", &self.date.format("%Y-%m-%d").to_string())?;
        map.serialize_entry("latitude", &self.coordinate.latitude())?;
        map.serialize_entry("longitude", &self.coordinate.longitude())?;
        for (variable, value) in &self.predictions {
            map.serialize_entry(&variable.predicted_key(), value)?;
        }
        map.end()
    }
}

/// Rounds to two decimal places, half away from zero.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(21.3749), 21.37);
        assert_eq!(round2(21.375), 21.38);
        assert_eq!(round2(-0.004), -0.0);
        assert_eq!(round2(7.0), 7.0);
    }

    #[test]
    fn serializes_flat_mapping() {
        let mut predictions = BTreeMap::new();
        predictions.insert(Variable::Temperature, 24.5);
        predictions.insert(Variable::UvIndex, 6.12);
        let result = ForecastResult::new(
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            Coordinate::new(-23.51, -47.45).unwrap(),
            predictions,
        );

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "data": "2025-10-01",
                "latitude": -23.51,
                "longitude": -47.45,
                "temperatura_previsto": 24.5,
                "uv_previsto": 6.12,
            })
        );
        assert_eq!(result.get(Variable::UvIndex), Some(6.12));
        assert_eq!(result.get(Variable::WindSpeed), None);
    }
}
