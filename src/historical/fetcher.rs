use crate::historical::error::DataSourceError;
use crate::historical::response::PowerResponse;
use crate::types::coordinate::Coordinate;
use crate::types::series::{HistoricalSeries, Observation};
use crate::types::variable::Variable;
use bon::{bon, Builder};
use chrono::NaiveDate;
use log::{debug, info, warn};
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://power.larc.nasa.gov";
const POINT_PATH: &str = "/api/temporal/daily/point";
const COMMUNITY: &str = "RE";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Inclusive range of history the models are trained on.
///
/// Defaults to 2010-01-01 through 2024-12-31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
pub struct HistoricalWindow {
    #[builder(default = default_window_start())]
    pub start: NaiveDate,
    #[builder(default = default_window_end())]
    pub end: NaiveDate,
}

impl Default for HistoricalWindow {
    fn default() -> Self {
        Self {
            start: default_window_start(),
            end: default_window_end(),
        }
    }
}

fn default_window_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn default_window_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or(NaiveDate::MIN)
}

/// Downloads daily history for the eight tracked variables from NASA POWER.
pub struct HistoricalFetcher {
    base_url: String,
    client: Client,
}

#[bon]
impl HistoricalFetcher {
    /// Creates a fetcher.
    ///
    /// * `.base_url(..)`: Optional. Service root, defaults to [`DEFAULT_BASE_URL`].
    /// * `.timeout(..)`: Optional. Whole-request timeout, defaults to 120 s.
    #[builder]
    pub fn new(
        #[builder(into)] base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, DataSourceError> {
        let client = Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(DataSourceError::ClientBuild)?;
        Ok(Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client,
        })
    }

    /// Fetches every day in `[start, end]` for `coordinate` in a single request.
    ///
    /// Variables the service leaves out come back as all-missing, and values equal
    /// to the response's fill value become `None`. The result is sorted by date.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError`] when the request cannot be sent, the service
    /// answers with an error status, or the body is not a POWER daily payload.
    pub async fn fetch(
        &self,
        coordinate: Coordinate,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HistoricalSeries, DataSourceError> {
        if start > end {
            return Err(DataSourceError::InvalidRange { start, end });
        }
        let url = format!("{}{}", self.base_url, POINT_PATH);
        let parameters = Variable::ALL
            .iter()
            .map(|v| v.request_code())
            .collect::<Vec<_>>()
            .join(",");
        let query = [
            ("parameters", parameters),
            ("community", COMMUNITY.to_string()),
            ("longitude", coordinate.longitude().to_string()),
            ("latitude", coordinate.latitude().to_string()),
            ("start", start.format("%Y%m%d").to_string()),
            ("end", end.format("%Y%m%d").to_string()),
            ("format", "JSON".to_string()),
        ];
        info!(
            "Requesting daily history for ({}, {}) from {} to {}",
            coordinate.latitude(),
            coordinate.longitude(),
            start,
            end
        );

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| DataSourceError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    DataSourceError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    DataSourceError::NetworkRequest(url, e)
                });
            }
        };

        let body = response
            .bytes()
            .await
            .map_err(|e| DataSourceError::Body(url.clone(), e))?;
        let payload: PowerResponse = serde_json::from_slice(&body)
            .map_err(|e| DataSourceError::Parse { url, source: e })?;

        let series = series_from_response(&payload)?;
        info!(
            "Collected {} daily records for ({}, {})",
            series.len(),
            coordinate.latitude(),
            coordinate.longitude()
        );
        Ok(series)
    }

    pub async fn fetch_window(
        &self,
        coordinate: Coordinate,
        window: &HistoricalWindow,
    ) -> Result<HistoricalSeries, DataSourceError> {
        self.fetch(coordinate, window.start, window.end).await
    }
}

/// Pivots the per-parameter maps of a response into one observation per date.
pub(crate) fn series_from_response(
    payload: &PowerResponse,
) -> Result<HistoricalSeries, DataSourceError> {
    let fill_value = payload.fill_value();
    let parameters = &payload.properties.parameter;
    let mut rows: BTreeMap<NaiveDate, Observation> = BTreeMap::new();

    for variable in Variable::ALL {
        let column = variable
            .power_codes()
            .iter()
            .find_map(|code| parameters.get(*code));
        let Some(column) = column else {
            debug!("No data for {} in response, treating it as missing", variable);
            continue;
        };
        for (key, value) in column {
            let date = parse_date_key(key)?;
            let value = value.filter(|v| v.is_finite() && *v != fill_value);
            rows.entry(date)
                .or_insert_with(|| Observation::empty(date))
                .set(variable, value);
        }
    }

    HistoricalSeries::from_observations(rows.into_values().collect())
}

fn parse_date_key(key: &str) -> Result<NaiveDate, DataSourceError> {
    let invalid = || DataSourceError::InvalidDateKey(key.to_string());
    if key.len() != 8 || !key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(key, "%Y%m%d").map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> PowerResponse {
        serde_json::from_value(value).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_date_keys() {
        assert_eq!(parse_date_key("20240229").unwrap(), date(2024, 2, 29));
        assert!(parse_date_key("20230229").is_err());
        assert!(parse_date_key("2024-01-01").is_err());
        assert!(parse_date_key("2024011").is_err());
        assert!(parse_date_key("202401011").is_err());
        assert!(parse_date_key("+2024011").is_err());
        assert!(parse_date_key("20241301").is_err());
        assert_eq!(parse_date_key("19810101").unwrap(), date(1981, 1, 1));
    }

    #[test]
    fn every_observation_has_all_variables() {
        let response = payload(json!({
            "properties": {"parameter": {
                "T2M": {"20240101": 25.1, "20240102": 26.0},
                "RH2M": {"20240102": 70.0, "20240103": 72.5}
            }}
        }));

        let series = series_from_response(&response).unwrap();
        assert_eq!(series.len(), 3);
        let first = &series.observations()[0];
        assert_eq!(first.get(Variable::Temperature), Some(25.1));
        assert_eq!(first.get(Variable::Humidity), None);
        assert_eq!(first.get(Variable::WindSpeed), None);
        assert_eq!(series.observations()[2].get(Variable::Humidity), Some(72.5));
    }

    #[test]
    fn fill_values_and_nulls_become_missing() {
        let response = payload(json!({
            "header": {"fill_value": -999.0},
            "properties": {"parameter": {
                "T2M": {"20240101": -999.0, "20240102": null, "20240103": 19.0}
            }}
        }));

        let series = series_from_response(&response).unwrap();
        assert_eq!(
            series.column(Variable::Temperature),
            vec![
                (date(2024, 1, 1), None),
                (date(2024, 1, 2), None),
                (date(2024, 1, 3), Some(19.0)),
            ]
        );
    }

    #[test]
    fn legacy_precipitation_code_matches_primary() {
        let primary = payload(json!({
            "properties": {"parameter": {"PRECTOTCORR": {"20240101": 3.2, "20240102": 0.0}}}
        }));
        let legacy = payload(json!({
            "properties": {"parameter": {"PRECTOT": {"20240101": 3.2, "20240102": 0.0}}}
        }));
        assert_eq!(
            series_from_response(&primary).unwrap(),
            series_from_response(&legacy).unwrap()
        );
    }

    #[test]
    fn primary_precipitation_code_wins() {
        let response = payload(json!({
            "properties": {"parameter": {
                "PRECTOTCORR": {"20240101": 1.5},
                "PRECTOT": {"20240101": 9.9}
            }}
        }));
        let series = series_from_response(&response).unwrap();
        assert_eq!(series.observations()[0].get(Variable::Precipitation), Some(1.5));
    }

    #[test]
    fn rejects_malformed_keys() {
        let response = payload(json!({
            "properties": {"parameter": {"T2M": {"2024-01-01": 20.0}}}
        }));
        assert!(matches!(
            series_from_response(&response),
            Err(DataSourceError::InvalidDateKey(key)) if key == "2024-01-01"
        ));
    }

    #[test]
    fn default_window_spans_fifteen_years() {
        let window = HistoricalWindow::default();
        assert_eq!(window.start, date(2010, 1, 1));
        assert_eq!(window.end, date(2024, 12, 31));
        assert_eq!(HistoricalWindow::builder().build(), window);
    }
}
