//! # Data Logger Table Reader
//!
//! Reads the most recent observation from a Campbell Scientific TOA5
//! table file.
//!
//! Layout of a TOA5 `.dat` file:
//!
//! ```text
//! row 0   "TOA5","Mesonet","CR1000",...        file/environment metadata
//! row 1   "TIMESTAMP","RECORD","WD","WS",...   column names
//! row 2   "TS","RN","Deg","meters/second",...  units
//! row 3   "","","Smp","Avg",...                processing
//! row 4+  "2024-03-15 14:32:00",102,180,5,...  data
//! ```

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;
use tracing::debug;

use crate::config::{ColumnConfig, DataLogConfig};
use crate::error::{CwopError, Result};
use crate::observation::Observation;

/// Index of the column-name row
const HEADER_ROW: usize = 1;

/// Index of the first data row
const FIRST_DATA_ROW: usize = 4;

/// Timestamp layouts written by the logger
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Read the last data row of the configured table
///
/// # Errors
///
/// - [`CwopError::DataLog`] if the file cannot be read or has no data rows
/// - [`CwopError::InvalidRecord`] if a configured column is absent or a
///   value in the last row cannot be parsed
pub fn read_last_observation(config: &DataLogConfig) -> Result<Observation> {
    let (header, row) = read_last_row(&config.path)?;
    let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
        CwopError::DataLog(format!(
            "invalid UTC offset: {} minutes",
            config.utc_offset_minutes
        ))
    })?;

    parse_row(&header, &row, &config.columns, offset)
}

/// Header row and last data row of a TOA5 file
fn read_last_row<P: AsRef<Path>>(path: P) -> Result<(StringRecord, StringRecord)> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| CwopError::DataLog(format!("failed to open {}: {}", path.display(), e)))?;

    let mut header = None;
    let mut last = None;
    let mut rows = 0usize;

    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            CwopError::DataLog(format!("failed to read {}: {}", path.display(), e))
        })?;

        match index {
            HEADER_ROW => header = Some(record),
            i if i >= FIRST_DATA_ROW => last = Some(record),
            _ => {}
        }
        rows = index + 1;
    }

    let header = header.ok_or_else(|| {
        CwopError::DataLog(format!("{} has no column header row", path.display()))
    })?;
    let last = last
        .ok_or_else(|| CwopError::DataLog(format!("{} has no data rows", path.display())))?;

    debug!("Read {} rows from {}", rows, path.display());
    Ok((header, last))
}

fn parse_row(
    header: &StringRecord,
    row: &StringRecord,
    columns: &ColumnConfig,
    offset: FixedOffset,
) -> Result<Observation> {
    Ok(Observation {
        timestamp: parse_timestamp(field(header, row, &columns.timestamp)?, offset)?,
        wind_direction_deg: number(header, row, &columns.wind_direction)?,
        wind_speed_mps: number(header, row, &columns.wind_speed)?,
        air_temperature_c: number(header, row, &columns.air_temperature)?,
        rain_1h_mm: number(header, row, &columns.rain_1h)?,
        rain_daily_mm: number(header, row, &columns.rain_daily)?,
        pressure_hpa: number(header, row, &columns.pressure)?,
        humidity_pct: number(header, row, &columns.humidity)?,
    })
}

/// Trimmed, non-empty value of a named column
fn field<'a>(header: &StringRecord, row: &'a StringRecord, column: &str) -> Result<&'a str> {
    let index = header
        .iter()
        .position(|name| name.trim() == column)
        .ok_or_else(|| CwopError::InvalidRecord(format!("column {} not found in header", column)))?;

    match row.get(index).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(CwopError::InvalidRecord(format!("missing value for {}", column))),
    }
}

fn number(header: &StringRecord, row: &StringRecord, column: &str) -> Result<f64> {
    let value = field(header, row, column)?;

    // Logger sentinel for a failed sensor read
    if value.eq_ignore_ascii_case("nan") {
        return Err(CwopError::InvalidRecord(format!("{} has no reading (NAN)", column)));
    }

    value
        .parse::<f64>()
        .map_err(|_| CwopError::InvalidRecord(format!("{} is not numeric: {:?}", column, value)))
}

/// Parse a logger timestamp taken at `offset` and convert it to UTC
fn parse_timestamp(value: &str, offset: FixedOffset) -> Result<DateTime<Utc>> {
    let naive = TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| CwopError::InvalidRecord(format!("failed to parse timestamp: {}", value)))?;

    match naive.and_local_timezone(offset) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
        LocalResult::None => Err(CwopError::InvalidRecord(format!("invalid timestamp: {}", value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TOA5_PREAMBLE: &str = r#""TOA5","Mesonet","CR1000","1234","CR1000.Std.32","CPU:meso.CR1","12345","Table1"
"TIMESTAMP","RECORD","WD","WS","AT","RH","BP","RN60","RNDAY"
"TS","RN","Deg","meters/second","Deg C","%","hPa","mm","mm"
"","","Smp","Avg","Avg","Smp","Smp","Tot","Tot"
"#;

    fn write_table(rows: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(TOA5_PREAMBLE.as_bytes()).unwrap();
        file.write_all(rows.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn config_for(file: &NamedTempFile) -> DataLogConfig {
        DataLogConfig {
            path: file.path().to_string_lossy().into_owned(),
            ..DataLogConfig::default()
        }
    }

    #[test]
    fn test_reads_last_row_only() {
        let file = write_table(
            "\"2024-03-15 14:27:00\",101,175,4.8,-1.9,99.8,1008.1,0.4,2.9\n\
             \"2024-03-15 14:32:00\",102,180,5,-2,100,1008,0.5,3\n",
        );

        let obs = read_last_observation(&config_for(&file)).unwrap();
        assert_eq!(obs.timestamp, Utc.with_ymd_and_hms(2024, 3, 15, 14, 32, 0).unwrap());
        assert_eq!(obs.wind_direction_deg, 180.0);
        assert_eq!(obs.wind_speed_mps, 5.0);
        assert_eq!(obs.air_temperature_c, -2.0);
        assert_eq!(obs.humidity_pct, 100.0);
        assert_eq!(obs.pressure_hpa, 1008.0);
        assert_eq!(obs.rain_1h_mm, 0.5);
        assert_eq!(obs.rain_daily_mm, 3.0);
    }

    #[test]
    fn test_utc_offset_applied() {
        let file = write_table("\"2024-03-15 08:32:00\",102,180,5,-2,100,1008,0.5,3\n");
        let config = DataLogConfig {
            utc_offset_minutes: -360,
            ..config_for(&file)
        };

        let obs = read_last_observation(&config).unwrap();
        assert_eq!(obs.timestamp, Utc.with_ymd_and_hms(2024, 3, 15, 14, 32, 0).unwrap());
    }

    #[test]
    fn test_fractional_and_short_timestamps() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 3, 15, 14, 32, 0).unwrap();

        assert_eq!(parse_timestamp("2024-03-15 14:32:00", offset).unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-15 14:32", offset).unwrap(), expected);
        assert!(parse_timestamp("2024-03-15 14:32:00.5", offset).is_ok());
        assert!(matches!(
            parse_timestamp("15/03/2024", offset),
            Err(CwopError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_no_data_rows() {
        let file = write_table("");
        match read_last_observation(&config_for(&file)) {
            Err(CwopError::DataLog(msg)) => assert!(msg.contains("no data rows")),
            other => panic!("Expected DataLog error, got: {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let config = DataLogConfig {
            path: "/nonexistent/Mesonet.dat".to_string(),
            ..DataLogConfig::default()
        };
        assert!(matches!(read_last_observation(&config), Err(CwopError::DataLog(_))));
    }

    #[test]
    fn test_missing_column() {
        let file = write_table("\"2024-03-15 14:32:00\",102,180,5,-2,100,1008,0.5,3\n");
        let mut config = config_for(&file);
        config.columns.humidity = "RH_Avg".to_string();

        match read_last_observation(&config) {
            Err(CwopError::InvalidRecord(msg)) => assert!(msg.contains("RH_Avg")),
            other => panic!("Expected InvalidRecord, got: {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_value() {
        let file = write_table("\"2024-03-15 14:32:00\",102,180,fast,-2,100,1008,0.5,3\n");
        match read_last_observation(&config_for(&file)) {
            Err(CwopError::InvalidRecord(msg)) => assert!(msg.contains("WS")),
            other => panic!("Expected InvalidRecord, got: {:?}", other),
        }
    }

    #[test]
    fn test_nan_sentinel_rejected() {
        let file = write_table("\"2024-03-15 14:32:00\",102,180,5,-2,100,\"NAN\",0.5,3\n");
        match read_last_observation(&config_for(&file)) {
            Err(CwopError::InvalidRecord(msg)) => assert!(msg.contains("BP")),
            other => panic!("Expected InvalidRecord, got: {:?}", other),
        }
    }

    #[test]
    fn test_truncated_row() {
        let file = write_table("\"2024-03-15 14:32:00\",102,180,5,-2,100\n");
        match read_last_observation(&config_for(&file)) {
            Err(CwopError::InvalidRecord(msg)) => assert!(msg.contains("missing value")),
            other => panic!("Expected InvalidRecord, got: {:?}", other),
        }
    }
}
