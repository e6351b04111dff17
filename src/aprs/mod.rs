//! # APRS Weather Report Module
//!
//! Encoding of station observations into the APRS/CWOP text format.
//!
//! This module handles:
//! - Unit conversions (m/s to mph, Celsius to Fahrenheit, altimeter pressure)
//! - Fixed-width weather field formatting
//! - APRS-IS login line construction

pub mod protocol;
pub mod convert;
pub mod encoder;
