//! # APRS Weather Report Encoder
//!
//! Encodes one station observation into a CWOP weather report line
//! (timestamp, position, then fixed-width weather fields).

use chrono::{Datelike, Timelike};

use super::convert::{altimeter_adjust, celsius_to_fahrenheit, meters_per_second_to_mph};
use super::protocol::*;
use crate::config::StationConfig;
use crate::error::Result;
use crate::observation::Observation;

/// Encode an observation into a complete APRS report line
///
/// # Arguments
///
/// * `observation` - One observation record (validated before encoding)
/// * `station` - Static station parameters
///
/// # Returns
///
/// * `Result<AprsReport>` - Report bytes terminated by CR LF
///
/// # Errors
///
/// Returns [`CwopError::InvalidRecord`](crate::error::CwopError::InvalidRecord)
/// if any observation field is non-numeric or out of range.
///
/// # Format
///
/// ```text
/// FW1234>APRS,TCPIP*:@151432z3037.13N/09620.38W_180/011g...t-28r050P300h00b10159\r\n
/// ```
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use meso_cwop::aprs::encoder::encode;
/// use meso_cwop::config::StationConfig;
/// use meso_cwop::observation::Observation;
///
/// let station = StationConfig {
///     id: "FW1234".to_string(),
///     latitude: "3037.13N".to_string(),
///     longitude: "09620.38W".to_string(),
///     elevation_m: 67.0,
/// };
/// let observation = Observation {
///     timestamp: Utc.with_ymd_and_hms(2024, 3, 15, 14, 32, 0).unwrap(),
///     wind_direction_deg: 180.0,
///     wind_speed_mps: 5.0,
///     air_temperature_c: -2.0,
///     rain_1h_mm: 0.5,
///     rain_daily_mm: 3.0,
///     pressure_hpa: 1008.0,
///     humidity_pct: 100.0,
/// };
///
/// let report = encode(&observation, &station)?;
/// assert_eq!(
///     report.as_str(),
///     "FW1234>APRS,TCPIP*:@151432z3037.13N/09620.38W_180/011g...t-28r050P300h00b10159"
/// );
/// # Ok::<(), meso_cwop::error::CwopError>(())
/// ```
pub fn encode(observation: &Observation, station: &StationConfig) -> Result<AprsReport> {
    observation.validate()?;

    let mut line = String::with_capacity(96);
    line.push_str(&station.id);
    line.push_str(APRS_TCPIP_PATH);
    line.push_str(&time_field(observation));
    line.push_str(&position_field(station));
    line.push_str(&format!("_{:03}", round_half_even(observation.wind_direction_deg)));
    line.push_str(&format!(
        "/{:03}",
        round_half_even(meters_per_second_to_mph(observation.wind_speed_mps))
    ));
    line.push_str(GUST_PLACEHOLDER);
    if let Some(temperature) = temperature_field(observation.air_temperature_c) {
        line.push_str(&temperature);
    }
    line.push_str(&format!("r{:03}", rain_hundredths(observation.rain_1h_mm)));
    line.push_str(&format!("P{:03}", rain_hundredths(observation.rain_daily_mm)));
    line.push_str(&humidity_field(observation.humidity_pct));
    line.push_str(&format!(
        "b{:05}",
        round_half_even(altimeter_adjust(observation.pressure_hpa, station.elevation_m) * 10.0)
    ));
    line.push_str(LINE_TERMINATOR);

    Ok(AprsReport::new(line))
}

/// Round to the nearest integer, ties to even
///
/// Every rounded report field uses this rule.
pub fn round_half_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// `@DDHHMMz` from the observation's UTC calendar fields
fn time_field(observation: &Observation) -> String {
    let ts = observation.timestamp;
    format!("@{:02}{:02}{:02}z", ts.day(), ts.hour(), ts.minute())
}

fn position_field(station: &StationConfig) -> String {
    format!("{}/{}", station.latitude, station.longitude)
}

/// Temperature field, or `None` for exactly 0 °C
///
/// The sign branch follows the Celsius reading: below freezing the
/// magnitude of the Fahrenheit value is written after `t-`, above
/// freezing the Fahrenheit value is written with three digits. A reading
/// of exactly zero emits no temperature field at all.
fn temperature_field(celsius: f64) -> Option<String> {
    let fahrenheit = round_half_even(celsius_to_fahrenheit(celsius));

    if celsius < 0.0 {
        Some(format!("t-{:02}", fahrenheit.abs()))
    } else if celsius > 0.0 {
        Some(format!("t{:03}", fahrenheit))
    } else {
        None
    }
}

/// Raw rain reading scaled by 100 and rounded
fn rain_hundredths(rain_mm: f64) -> i64 {
    round_half_even(rain_mm * 100.0)
}

/// `hXX`, with 100% written as `h00`
fn humidity_field(humidity: f64) -> String {
    match round_half_even(humidity) {
        100 => "h00".to_string(),
        rounded => format!("h{:02}", rounded),
    }
}
