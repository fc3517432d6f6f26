//! Daily observation table built by the fetcher and consumed by the trainer.

use crate::historical::error::DataSourceError;
use crate::types::variable::Variable;
use chrono::NaiveDate;
use polars::prelude::{Column, DataFrame, PolarsResult};

/// All eight variable readings for a single day.
///
/// Every variable has a slot; a reading the data source did not provide is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    values: [Option<f64>; Variable::COUNT],
}

impl Observation {
    /// Creates an observation with every variable missing.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            values: [None; Variable::COUNT],
        }
    }

    pub fn with(mut self, variable: Variable, value: Option<f64>) -> Self {
        self.set(variable, value);
        self
    }

    pub fn get(&self, variable: Variable) -> Option<f64> {
        self.values[variable.index()]
    }

    pub fn set(&mut self, variable: Variable, value: Option<f64>) {
        self.values[variable.index()] = value;
    }
}

/// A chronologically ordered run of daily observations with no repeated dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalSeries {
    observations: Vec<Observation>,
}

impl HistoricalSeries {
    /// Builds a series, sorting by date.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError::DuplicateDate`] if two observations share a date.
    pub fn from_observations(
        mut observations: Vec<Observation>,
    ) -> Result<Self, DataSourceError> {
        observations.sort_by_key(|o| o.date);
        if let Some(pair) = observations.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(DataSourceError::DuplicateDate(pair[0].date));
        }
        Ok(Self { observations })
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.observations.iter().map(|o| o.date)
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    /// The `(date, value)` sub-series of one variable, gaps included.
    pub fn column(&self, variable: Variable) -> Vec<(NaiveDate, Option<f64>)> {
        self.observations
            .iter()
            .map(|o| (o.date, o.get(variable)))
            .collect()
    }

    /// Number of days on which `variable` has a value.
    pub fn observed_count(&self, variable: Variable) -> usize {
        self.observations
            .iter()
            .filter(|o| o.get(variable).is_some())
            .count()
    }

    /// Converts the series into a polars `DataFrame`.
    ///
    /// The frame has a `date` column followed by one nullable `f64` column per
    /// variable, named by [`Variable::key`].
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns = Vec::with_capacity(Variable::COUNT + 1);
        let dates: Vec<NaiveDate> = self.dates().collect();
        columns.push(Column::new("date".into(), dates));
        for variable in Variable::ALL {
            let values: Vec<Option<f64>> =
                self.observations.iter().map(|o| o.get(variable)).collect();
            columns.push(Column::new(variable.key().into(), values));
        }
        DataFrame::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn sorts_observations_by_date() {
        let series = HistoricalSeries::from_observations(vec![
            Observation::empty(date(2020, 1, 3)),
            Observation::empty(date(2020, 1, 1)),
            Observation::empty(date(2020, 1, 2)),
        ])
        .unwrap();

        let dates: Vec<_> = series.dates().collect();
        assert_eq!(dates, vec![date(2020, 1, 1), date(2020, 1, 2), date(2020, 1, 3)]);
        assert_eq!(series.start(), Some(date(2020, 1, 1)));
        assert_eq!(series.end(), Some(date(2020, 1, 3)));
    }

    #[test]
    fn rejects_duplicate_dates() {
        let result = HistoricalSeries::from_observations(vec![
            Observation::empty(date(2020, 1, 1)),
            Observation::empty(date(2020, 1, 1)),
        ]);
        assert!(matches!(result, Err(DataSourceError::DuplicateDate(d)) if d == date(2020, 1, 1)));
    }

    #[test]
    fn column_keeps_gaps() {
        let series = HistoricalSeries::from_observations(vec![
            Observation::empty(date(2020, 1, 1)).with(Variable::Humidity, Some(80.5)),
            Observation::empty(date(2020, 1, 2)),
        ])
        .unwrap();

        assert_eq!(
            series.column(Variable::Humidity),
            vec![(date(2020, 1, 1), Some(80.5)), (date(2020, 1, 2), None)]
        );
        assert_eq!(series.observed_count(Variable::Humidity), 1);
        assert_eq!(series.observed_count(Variable::UvIndex), 0);
    }

    #[test]
    fn dataframe_has_one_column_per_variable() {
        let series = HistoricalSeries::from_observations(vec![
            Observation::empty(date(2021, 6, 1)).with(Variable::Temperature, Some(18.25)),
            Observation::empty(date(2021, 6, 2)),
        ])
        .unwrap();

        let frame = series.to_dataframe().unwrap();
        assert_eq!(frame.shape(), (2, Variable::COUNT + 1));
        let names: Vec<&str> = frame
            .get_column_names()
            .iter()
            .map(|name| name.as_str())
            .collect();
        assert_eq!(
            names,
            [
                "date",
                "temperatura",
                "temperatura_max",
                "temperatura_min",
                "precipitacao",
                "precipitacao_neve",
                "umidade",
                "uv",
                "vento",
            ]
        );
        assert_eq!(frame.column("temperatura").unwrap().null_count(), 1);
    }

    #[test]
    fn dataframe_columns_match_series_columns() {
        let series = HistoricalSeries::from_observations(vec![
            Observation::empty(date(2021, 6, 2)).with(Variable::WindSpeed, Some(3.5)),
            Observation::empty(date(2021, 6, 1))
                .with(Variable::WindSpeed, Some(4.25))
                .with(Variable::UvIndex, Some(7.0)),
        ])
        .unwrap();

        let frame = series.to_dataframe().unwrap();
        for variable in Variable::ALL {
            let column = frame.column(variable.key()).unwrap().f64().unwrap();
            let values: Vec<Option<f64>> = column.into_iter().collect();
            let expected: Vec<Option<f64>> =
                series.column(variable).into_iter().map(|(_, v)| v).collect();
            assert_eq!(values, expected, "{}", variable);
        }
        assert_eq!(frame.column("date").unwrap().null_count(), 0);
    }
}
