//! # Raw Event Transport
//!
//! Evdev-backed transport for space navigator devices.
//!
//! This module handles:
//! - Device discovery by scanning `/dev/input` and matching device names
//! - Reading fixed-size kernel input records, blocking or non-blocking
//! - Probing for an LED indicator capability and writing LED records
//! - `poll(2)`-based readiness waits with a deadline
//!
//! The core consumes transports through the [`EventTransport`] trait; the
//! concrete [`EvdevTransport`] here is what [`SpaceNavigator::open`]
//! produces.
//!
//! [`SpaceNavigator::open`]: crate::navigator::SpaceNavigator::open

pub mod record;
pub mod stream_trait;

pub use record::{Channel, RawRecord};
pub use stream_trait::EventTransport;

use evdev::{Device, EventType, InputEvent};
use std::collections::VecDeque;
use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Well-known symlink some udev setups create for the device node.
const PREFERRED_DEVICE_PATH: &str = "/dev/input/spacemouse";

/// Directory scanned during discovery.
const INPUT_DIR: &str = "/dev/input";

/// Evdev-backed event transport
///
/// Wraps one open `/dev/input/eventX` node. Records fetched from the
/// kernel in batches are queued internally and handed out one at a time.
pub struct EvdevTransport {
    device: Device,
    pending: VecDeque<RawRecord>,
    indicator: Option<u16>,
    path: PathBuf,
}

impl std::fmt::Debug for EvdevTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvdevTransport")
            .field("path", &self.path)
            .field("indicator", &self.indicator)
            .finish_non_exhaustive()
    }
}

impl EvdevTransport {
    /// Open a specific device node.
    ///
    /// Probes the device's LED capabilities; the first supported LED
    /// becomes the indicator channel.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the node cannot be opened (missing node,
    /// permission denied, file-descriptor exhaustion).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let device = Device::open(path)?;

        let indicator = device
            .supported_leds()
            .and_then(|leds| leds.iter().next())
            .map(|led| led.0);

        if let Some(code) = indicator {
            debug!("Device {} has LED indicator (code {})", path.display(), code);
        }

        Ok(Self {
            device,
            pending: VecDeque::new(),
            indicator,
            path: path.to_path_buf(),
        })
    }

    /// Discover a space navigator by scanning `/dev/input`.
    ///
    /// Tries the `spacemouse` symlink first, then every `eventX` node in
    /// sorted order. A device matches when its name contains every pattern
    /// in `patterns`.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` if no device matches. Nodes that
    /// cannot be opened (typically permissions) are skipped.
    pub fn discover(patterns: &[String]) -> Result<Self> {
        if let Ok(transport) = Self::open_matching(Path::new(PREFERRED_DEVICE_PATH), patterns) {
            return Ok(transport);
        }

        let entries = match std::fs::read_dir(INPUT_DIR) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Could not read {}: {}", INPUT_DIR, e);
                return Err(Error::DeviceNotFound);
            }
        };

        // Sort for deterministic selection when several nodes match
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().starts_with("event"))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        for path in paths {
            match Self::open_matching(&path, patterns) {
                Ok(transport) => {
                    info!("Found space navigator at: {}", transport.path.display());
                    return Ok(transport);
                }
                Err(e) => {
                    debug!("Skipping {}: {}", path.display(), e);
                }
            }
        }

        Err(Error::DeviceNotFound)
    }

    /// Open `path` if its device name matches all `patterns`.
    fn open_matching(path: &Path, patterns: &[String]) -> Result<Self> {
        let transport = Self::open(path)?;
        let name = transport.device.name().unwrap_or("");

        debug!("Found input device: {} ({:?})", path.display(), name);

        if name_matches(name, patterns) {
            Ok(transport)
        } else {
            Err(Error::DeviceNotFound)
        }
    }

    /// Path of the opened device node.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Human-readable device name from the kernel, if reported.
    #[must_use]
    pub fn device_name(&self) -> Option<&str> {
        self.device.name()
    }
}

/// True when `name` contains every pattern in `patterns`.
fn name_matches(name: &str, patterns: &[String]) -> bool {
    !patterns.is_empty() && patterns.iter().all(|pattern| name.contains(pattern.as_str()))
}

impl EventTransport for EvdevTransport {
    fn read_record(&mut self) -> io::Result<RawRecord> {
        if let Some(record) = self.pending.pop_front() {
            return Ok(record);
        }

        let events = self.device.fetch_events()?;
        self.pending.extend(events.map(|event| RawRecord::from(&event)));

        self.pending
            .pop_front()
            .ok_or_else(|| io::ErrorKind::WouldBlock.into())
    }

    fn write_led(&mut self, code: u16, on: bool) -> io::Result<()> {
        let event = InputEvent::new(EventType::LED, code, i32::from(on));
        self.device.send_events(&[event])
    }

    fn poll_readable(&mut self, timeout: Duration) -> io::Result<bool> {
        // Queued records count as readable
        if !self.pending.is_empty() {
            return Ok(true);
        }

        let mut pfd = libc::pollfd {
            fd: self.device.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let timeout_ms = timeout.as_millis().min(i32::MAX as u128) as i32;

        let ret = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(ret > 0 && pfd.revents & libc::POLLIN != 0)
    }

    fn indicator_code(&self) -> Option<u16> {
        self.indicator
    }

    fn set_nonblocking(&mut self, nonblocking: bool) -> io::Result<()> {
        let fd = self.device.as_raw_fd();

        // Preserve existing flags; only touch O_NONBLOCK.
        let current = unsafe { libc::fcntl(fd, libc::F_GETFL) };
        if current < 0 {
            return Err(io::Error::last_os_error());
        }

        let flags = if nonblocking {
            current | libc::O_NONBLOCK
        } else {
            current & !libc::O_NONBLOCK
        };

        let ret = unsafe { libc::fcntl(fd, libc::F_SETFL, flags) };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl AsRawFd for EvdevTransport {
    fn as_raw_fd(&self) -> RawFd {
        self.device.as_raw_fd()
    }
}
