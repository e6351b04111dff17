//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{CwopError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub station: StationConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub datalog: DataLogConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Static station parameters, carried verbatim into every report
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StationConfig {
    /// CWOP station identifier (e.g. "FW1234")
    pub id: String,

    /// Latitude in APRS `ddmm.mmN` notation
    pub latitude: String,

    /// Longitude in APRS `dddmm.mmW` notation
    pub longitude: String,

    /// Station elevation in meters
    pub elevation_m: f64,
}

/// APRS-IS server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,

    #[serde(default = "default_server_port")]
    pub port: u16,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    #[serde(default = "default_client_name")]
    pub client_name: String,

    #[serde(default = "default_client_version")]
    pub client_version: String,
}

/// Data logger table configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DataLogConfig {
    #[serde(default = "default_datalog_path")]
    pub path: String,

    /// Offset of the logger clock from UTC, in minutes
    #[serde(default)]
    pub utc_offset_minutes: i32,

    #[serde(default)]
    pub columns: ColumnConfig,
}

/// Column names in the data logger table header
#[derive(Debug, Deserialize, Clone)]
pub struct ColumnConfig {
    #[serde(default = "default_column_timestamp")]
    pub timestamp: String,

    #[serde(default = "default_column_wind_direction")]
    pub wind_direction: String,

    #[serde(default = "default_column_wind_speed")]
    pub wind_speed: String,

    #[serde(default = "default_column_air_temperature")]
    pub air_temperature: String,

    #[serde(default = "default_column_rain_1h")]
    pub rain_1h: String,

    #[serde(default = "default_column_rain_daily")]
    pub rain_daily: String,

    #[serde(default = "default_column_pressure")]
    pub pressure: String,

    #[serde(default = "default_column_humidity")]
    pub humidity: String,
}

/// Upload schedule configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleConfig {
    #[serde(default = "default_interval_s")]
    pub interval_s: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily rolling log files; empty logs to stdout
    #[serde(default)]
    pub log_dir: String,
}

// Default value functions
fn default_server_host() -> String { "cwop.aprs.net".to_string() }
fn default_server_port() -> u16 { 14580 }
fn default_connect_timeout_ms() -> u64 { 10000 }
fn default_read_timeout_ms() -> u64 { 10000 }
fn default_client_name() -> String { env!("CARGO_PKG_NAME").to_string() }
fn default_client_version() -> String { env!("CARGO_PKG_VERSION").to_string() }

fn default_datalog_path() -> String { "Mesonet.dat".to_string() }

fn default_column_timestamp() -> String { "TIMESTAMP".to_string() }
fn default_column_wind_direction() -> String { "WD".to_string() }
fn default_column_wind_speed() -> String { "WS".to_string() }
fn default_column_air_temperature() -> String { "AT".to_string() }
fn default_column_rain_1h() -> String { "RN60".to_string() }
fn default_column_rain_daily() -> String { "RNDAY".to_string() }
fn default_column_pressure() -> String { "BP".to_string() }
fn default_column_humidity() -> String { "RH".to_string() }

fn default_interval_s() -> u64 { 300 }

fn default_log_level() -> String { "info".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
            client_name: default_client_name(),
            client_version: default_client_version(),
        }
    }
}

impl Default for DataLogConfig {
    fn default() -> Self {
        Self {
            path: default_datalog_path(),
            utc_offset_minutes: 0,
            columns: ColumnConfig::default(),
        }
    }
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            timestamp: default_column_timestamp(),
            wind_direction: default_column_wind_direction(),
            wind_speed: default_column_wind_speed(),
            air_temperature: default_column_air_temperature(),
            rain_1h: default_column_rain_1h(),
            rain_daily: default_column_rain_daily(),
            pressure: default_column_pressure(),
            humidity: default_column_humidity(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { interval_s: default_interval_s() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

impl ColumnConfig {
    /// All configured column names paired with their field labels
    pub fn named(&self) -> [(&'static str, &str); 8] {
        [
            ("timestamp", self.timestamp.as_str()),
            ("wind_direction", self.wind_direction.as_str()),
            ("wind_speed", self.wind_speed.as_str()),
            ("air_temperature", self.air_temperature.as_str()),
            ("rain_1h", self.rain_1h.as_str()),
            ("rain_daily", self.rain_daily.as_str()),
            ("pressure", self.pressure.as_str()),
            ("humidity", self.humidity.as_str()),
        ]
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use meso_cwop::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// Station metadata is passed through untouched; only the operational
    /// settings are range-checked.
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(invalid("server host cannot be empty"));
        }

        if self.server.port == 0 {
            return Err(invalid("server port must be non-zero"));
        }

        if self.server.connect_timeout_ms == 0 || self.server.connect_timeout_ms > 60000 {
            return Err(invalid("connect_timeout_ms must be between 1 and 60000"));
        }

        if self.server.read_timeout_ms == 0 || self.server.read_timeout_ms > 60000 {
            return Err(invalid("read_timeout_ms must be between 1 and 60000"));
        }

        if self.server.client_name.is_empty() || self.server.client_name.contains(char::is_whitespace) {
            return Err(invalid("client_name must be a single non-empty word"));
        }

        if self.server.client_version.is_empty() || self.server.client_version.contains(char::is_whitespace) {
            return Err(invalid("client_version must be a single non-empty word"));
        }

        if self.datalog.path.is_empty() {
            return Err(invalid("datalog path cannot be empty"));
        }

        // UTC offsets in use range from -12:00 to +14:00
        if self.datalog.utc_offset_minutes.abs() > 14 * 60 {
            return Err(invalid("utc_offset_minutes must be between -840 and 840"));
        }

        for (field, column) in self.datalog.columns.named() {
            if column.is_empty() {
                return Err(invalid(format!("column name for {} cannot be empty", field)));
            }
        }

        if self.schedule.interval_s == 0 || self.schedule.interval_s > 86400 {
            return Err(invalid("interval_s must be between 1 and 86400"));
        }

        if !["trace", "debug", "info", "warn", "error"]
            .contains(&self.logging.level.to_ascii_lowercase().as_str())
        {
            return Err(invalid("log level must be one of: trace, debug, info, warn, error"));
        }

        Ok(())
    }
}

fn invalid<T: std::fmt::Display>(msg: T) -> CwopError {
    CwopError::Config(toml::de::Error::custom(msg))
}
