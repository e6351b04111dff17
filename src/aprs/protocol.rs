//! # APRS-IS Protocol Constants and Types
//!
//! Wire-level definitions for CWOP uploads over APRS-IS.

use bytes::Bytes;

/// Default CWOP ingestion server
pub const CWOP_SERVER_HOST: &str = "cwop.aprs.net";

/// APRS-IS filtered-feed port accepted by CWOP (23 is the legacy alternative)
pub const CWOP_SERVER_PORT: u16 = 14580;

/// Maximum bytes consumed from each server banner/acknowledgment
pub const SERVER_READ_BUFFER_SIZE: usize = 1024;

/// Path appended to the station identifier in the packet header
pub const APRS_TCPIP_PATH: &str = ">APRS,TCPIP*:";

/// Gust field placeholder; the logger does not record gusts
pub const GUST_PLACEHOLDER: &str = "g...";

/// APRS-IS line terminator
pub const LINE_TERMINATOR: &str = "\r\n";

/// Receive-only passcode; CWOP stations do not need a verified login
pub const CWOP_PASSCODE: &str = "-1";

/// An encoded, ready-to-send APRS weather report line
///
/// Immutable once built and cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AprsReport(Bytes);

impl AprsReport {
    pub(crate) fn new(line: String) -> Self {
        Self(Bytes::from(line))
    }

    /// Raw bytes as sent on the wire (including trailing CR LF)
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Report text without the line terminator
    pub fn as_str(&self) -> &str {
        // Built from a String, so always valid UTF-8
        std::str::from_utf8(&self.0)
            .unwrap_or_default()
            .trim_end_matches(LINE_TERMINATOR)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for AprsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the APRS-IS login line for a CWOP station
///
/// # Arguments
///
/// * `station_id` - CWOP station identifier
/// * `client_name` - Software name reported to the server
/// * `client_version` - Software version reported to the server
///
/// # Examples
///
/// ```
/// use meso_cwop::aprs::protocol::build_login_line;
///
/// let login = build_login_line("FW1234", "meso-cwop", "0.1.0");
/// assert_eq!(login, "user FW1234 pass -1 vers meso-cwop 0.1.0\r\n");
/// ```
pub fn build_login_line(station_id: &str, client_name: &str, client_version: &str) -> String {
    format!(
        "user {} pass {} vers {} {}{}",
        station_id, CWOP_PASSCODE, client_name, client_version, LINE_TERMINATOR
    )
}
