//! # Unit Conversions
//!
//! Metric station readings to the units APRS weather reports expect.

/// Miles per hour in one meter per second
pub const MPH_PER_MPS: f64 = 2.23694;

/// Standard sea-level pressure (hPa)
const STANDARD_PRESSURE_HPA: f64 = 1013.25;

/// Standard temperature lapse rate (K/m)
const LAPSE_RATE_K_PER_M: f64 = 0.0065;

/// Standard sea-level temperature (K)
const STANDARD_TEMPERATURE_K: f64 = 288.0;

/// Exponent applied to the standard pressure term
const STANDARD_PRESSURE_EXPONENT: f64 = 0.19284;

/// Barometric exponent applied to the station pressure and the final power
const BAROMETRIC_EXPONENT: f64 = 0.190284;

/// Sensor offset subtracted from the station pressure (hPa)
const PRESSURE_OFFSET_HPA: f64 = 0.3;

/// Convert wind speed from meters/second to miles/hour
pub fn meters_per_second_to_mph(speed: f64) -> f64 {
    speed * MPH_PER_MPS
}

/// Convert temperature from degrees Celsius to degrees Fahrenheit
pub fn celsius_to_fahrenheit(temperature: f64) -> f64 {
    (9.0 / 5.0) * temperature + 32.0
}

/// Reduce station pressure to altimeter (estimated sea-level) pressure
///
/// # Arguments
///
/// * `pressure_hpa` - Station-level pressure in hectopascals
/// * `elevation_m` - Station elevation in meters
///
/// # Returns
///
/// * `f64` - Altimeter setting in hectopascals
///
/// # Algorithm
///
/// ```text
/// p1    = P - 0.3
/// frac1 = (1013.25^0.19284 * 0.0065) / 288
/// frac2 = H / (P - 0.3)^0.190284
/// A     = p1 * (1 + frac1 * frac2)^(1 / 0.190284)
/// ```
pub fn altimeter_adjust(pressure_hpa: f64, elevation_m: f64) -> f64 {
    let p1 = pressure_hpa - PRESSURE_OFFSET_HPA;
    let frac1 = (STANDARD_PRESSURE_HPA.powf(STANDARD_PRESSURE_EXPONENT) * LAPSE_RATE_K_PER_M)
        / STANDARD_TEMPERATURE_K;
    let frac2 = elevation_m / p1.powf(BAROMETRIC_EXPONENT);
    let p2 = (1.0 + frac1 * frac2).powf(1.0 / BAROMETRIC_EXPONENT);
    p1 * p2
}
