//! # Error Types
//!
//! Custom error types for the space navigator driver using `thiserror`.

use std::io;
use thiserror::Error;

/// Main error type for the driver
#[derive(Debug, Error)]
pub enum Error {
    /// No matching space navigator device was found during discovery
    #[error("no space navigator device found")]
    DeviceNotFound,

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Transport read failed for a reason other than "no data available"
    #[error("transport read error: {0}")]
    Read(#[source] io::Error),

    /// Writing the LED indicator record failed; the handle stays usable
    #[error("indicator write error: {0}")]
    IndicatorWrite(#[source] io::Error),

    /// I/O errors while opening, probing, or polling the device
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for the driver
pub type Result<T> = std::result::Result<T, Error>;
