//! # Meso CWOP Library
//!
//! Upload weather-station observations to the Citizen Weather Observer
//! Program (CWOP) over APRS-IS.
//!
//! This library reads the most recent row from a data-logger table,
//! encodes it as an APRS weather report and sends it to a CWOP server
//! using the APRS-IS login exchange.

pub mod config;
pub mod error;
pub mod observation;
pub mod aprs;
pub mod datalog;
pub mod uploader;
pub mod scheduler;
pub mod cycle;
