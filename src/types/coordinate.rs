use crate::error::ForecastError;
use serde::Serialize;

/// A forecast location in decimal degrees.
///
/// Latitude must lie in `[-90, 90]` and longitude in `[-180, 180]`; use
/// [`Coordinate::new`] to get a validated value.
///
/// # Examples
///
/// ```
/// use will_it_rain::Coordinate;
///
/// let sorocaba = Coordinate::new(-23.51, -47.45).unwrap();
/// assert_eq!(sorocaba.latitude(), -23.51);
/// assert_eq!(sorocaba.longitude(), -47.45);
///
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ForecastError> {
        let valid = (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(ForecastError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_boundaries() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_and_nan() {
        assert!(matches!(
            Coordinate::new(-90.5, 0.0),
            Err(ForecastError::InvalidCoordinate { .. })
        ));
        assert!(Coordinate::new(0.0, 180.01).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }
}
