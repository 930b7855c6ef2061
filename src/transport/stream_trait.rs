//! Trait abstraction for the raw event transport to enable testing

use std::io;
use std::time::Duration;

use super::record::RawRecord;

/// Trait for the byte-stream transport a device handle reads raw records
/// from.
///
/// Implementations deliver one fixed-size record per [`read_record`] call.
/// "No data available" in non-blocking mode is signalled with
/// [`io::ErrorKind::WouldBlock`]; every other error is fatal to the caller
/// and is never retried internally.
///
/// [`read_record`]: EventTransport::read_record
pub trait EventTransport {
    /// Read the next raw record, blocking unless the transport is in
    /// non-blocking mode.
    fn read_record(&mut self) -> io::Result<RawRecord>;

    /// Write one LED-state record to the device.
    fn write_led(&mut self, code: u16, on: bool) -> io::Result<()>;

    /// Wait until a record can be read without blocking, up to `timeout`.
    ///
    /// Returns `Ok(true)` when readable, `Ok(false)` on timeout.
    fn poll_readable(&mut self, timeout: Duration) -> io::Result<bool>;

    /// LED code of the indicator capability probed at open, if any.
    fn indicator_code(&self) -> Option<u16>;

    /// Switch the transport between blocking and non-blocking reads.
    fn set_nonblocking(&mut self, nonblocking: bool) -> io::Result<()>;
}
