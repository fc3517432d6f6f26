//! Wire format of the NASA POWER daily point endpoint.
//!
//! Only the parts the pipeline reads are modelled; everything else in the
//! GeoJSON feature (geometry, messages, units) is ignored.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Value the service uses for days it has no data for.
pub(crate) const DEFAULT_FILL_VALUE: f64 = -999.0;

#[derive(Debug, Deserialize)]
pub(crate) struct PowerResponse {
    #[serde(default)]
    pub header: Option<PowerHeader>,
    pub properties: PowerProperties,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PowerHeader {
    #[serde(default)]
    pub fill_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PowerProperties {
    /// Parameter code -> (`YYYYMMDD` -> value).
    pub parameter: HashMap<String, BTreeMap<String, Option<f64>>>,
}

impl PowerResponse {
    pub fn fill_value(&self) -> f64 {
        self.header
            .as_ref()
            .and_then(|h| h.fill_value)
            .unwrap_or(DEFAULT_FILL_VALUE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_payload() {
        let body = r#"{
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [-47.45, -23.51, 600.0]},
            "properties": {"parameter": {"T2M": {"20240101": 22.5, "20240102": null}}},
            "header": {"title": "NASA/POWER", "fill_value": -999.0}
        }"#;
        let response: PowerResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.fill_value(), -999.0);
        let t2m = &response.properties.parameter["T2M"];
        assert_eq!(t2m["20240101"], Some(22.5));
        assert_eq!(t2m["20240102"], None);
    }

    #[test]
    fn missing_header_uses_default_fill_value() {
        let body = r#"{"properties": {"parameter": {}}}"#;
        let response: PowerResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.fill_value(), DEFAULT_FILL_VALUE);
    }
}
