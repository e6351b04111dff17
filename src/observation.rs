//! # Observation Record
//!
//! One sample from the weather station, as handed to the encoder.

use chrono::{DateTime, Utc};

use crate::error::{CwopError, Result};

/// A single weather-station observation
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Sample time (UTC)
    pub timestamp: DateTime<Utc>,
    /// Wind direction in degrees (0-360)
    pub wind_direction_deg: f64,
    /// Wind speed in meters/second
    pub wind_speed_mps: f64,
    /// Air temperature in degrees Celsius
    pub air_temperature_c: f64,
    /// Rainfall over the last hour in millimeters
    pub rain_1h_mm: f64,
    /// Rainfall since local midnight in millimeters
    pub rain_daily_mm: f64,
    /// Station-level barometric pressure in hectopascals
    pub pressure_hpa: f64,
    /// Relative humidity in percent (0-100)
    pub humidity_pct: f64,
}

impl Observation {
    /// Check every field is numeric and physically plausible
    ///
    /// # Errors
    ///
    /// Returns [`CwopError::InvalidRecord`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        check_range("wind_direction", self.wind_direction_deg, 0.0, 360.0)?;
        check_range("wind_speed", self.wind_speed_mps, 0.0, f64::MAX)?;
        check_range("air_temperature", self.air_temperature_c, -90.0, 60.0)?;
        check_range("rain_1h", self.rain_1h_mm, 0.0, f64::MAX)?;
        check_range("rain_daily", self.rain_daily_mm, 0.0, f64::MAX)?;
        check_range("pressure", self.pressure_hpa, 300.0, 1100.0)?;
        check_range("humidity", self.humidity_pct, 0.0, 100.0)?;
        Ok(())
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(CwopError::InvalidRecord(format!(
            "{} is not a number ({})",
            field, value
        )));
    }

    if value < min || value > max {
        return Err(CwopError::InvalidRecord(format!(
            "{} {} out of range ({} to {})",
            field, value, min, max
        )));
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fixtures::sample_observation;
    use super::*;

    #[test]
    fn test_valid_observation() {
        assert!(sample_observation().validate().is_ok());
    }

    #[test]
    fn test_humidity_bounds_inclusive() {
        let mut obs = sample_observation();
        obs.humidity_pct = 0.0;
        assert!(obs.validate().is_ok());
        obs.humidity_pct = 100.0;
        assert!(obs.validate().is_ok());
    }

    #[test]
    fn test_humidity_out_of_range() {
        let mut obs = sample_observation();
        obs.humidity_pct = 100.5;
        match obs.validate() {
            Err(CwopError::InvalidRecord(msg)) => assert!(msg.starts_with("humidity")),
            other => panic!("Expected InvalidRecord, got: {:?}", other),
        }
    }

    #[test]
    fn test_nan_field_rejected() {
        let mut obs = sample_observation();
        obs.pressure_hpa = f64::NAN;
        match obs.validate() {
            Err(CwopError::InvalidRecord(msg)) => {
                assert!(msg.contains("pressure"));
                assert!(msg.contains("not a number"));
            }
            other => panic!("Expected InvalidRecord, got: {:?}", other),
        }
    }

    #[test]
    fn test_negative_wind_speed_rejected() {
        let mut obs = sample_observation();
        obs.wind_speed_mps = -0.1;
        assert!(obs.validate().is_err());
    }

    #[test]
    fn test_wind_direction_over_360_rejected() {
        let mut obs = sample_observation();
        obs.wind_direction_deg = 360.0;
        assert!(obs.validate().is_ok());
        obs.wind_direction_deg = 361.0;
        assert!(obs.validate().is_err());
    }

    #[test]
    fn test_negative_rain_rejected() {
        let mut obs = sample_observation();
        obs.rain_daily_mm = -1.0;
        assert!(obs.validate().is_err());
    }

    #[test]
    fn test_infinite_temperature_rejected() {
        let mut obs = sample_observation();
        obs.air_temperature_c = f64::INFINITY;
        assert!(obs.validate().is_err());
    }
}
