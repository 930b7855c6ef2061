//! # Space Navigator Device Handle
//!
//! This module owns the per-device session state: the transport, the
//! probed LED indicator, the deadzone filter, and the axis-group memory
//! used to zero the group the hardware omitted in a sync cycle.
//!
//! ## Event Loop
//!
//! The host application calls [`SpaceNavigator::next_event`] in a loop.
//! Raw records are consumed from the transport until a full logical event
//! is assembled: a button transition or a synchronized six-axis motion
//! sample. In non-blocking mode the call returns `Ok(None)` instead of
//! suspending, and the caller drives its own readiness wait on the
//! handle's raw descriptor.
//!
//! ## Usage
//!
//! ```no_run
//! use spacenav_input::{NavEvent, SpaceNavigator};
//!
//! let mut nav = SpaceNavigator::open()?;
//! nav.set_threshold(5);
//!
//! loop {
//!     match nav.next_event()? {
//!         Some(NavEvent::Motion(motion)) => println!("axes: {:?}", motion.axes),
//!         Some(NavEvent::Button(button)) => {
//!             println!("button {} {}", button.code, if button.pressed { "down" } else { "up" });
//!         }
//!         None => break, // non-blocking mode drained
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::navigator::calibration::{RestSampler, DEFAULT_CALIBRATION_WINDOW};
use crate::navigator::decoder::{Decoded, SampleAssembler};
use crate::navigator::event::{AxisGroup, MotionEvent, NavEvent, AXIS_COUNT};
use crate::navigator::filter::DeadzoneFilter;
use crate::transport::{EvdevTransport, EventTransport};

/// Handle to one open space navigator session.
///
/// Owns the transport for the lifetime of the session. Dropping the handle
/// turns the LED indicator off (best effort) and releases the device.
///
/// The handle is not thread-safe; drive it from a single thread. For
/// external readiness waits the underlying descriptor is exposed through
/// [`AsRawFd`] when the transport has one.
pub struct SpaceNavigator<T: EventTransport = EvdevTransport> {
    transport: T,
    indicator: Option<u16>,
    filter: DeadzoneFilter,
    last_group: Option<AxisGroup>,
    calibration_window: Duration,
}

impl SpaceNavigator<EvdevTransport> {
    /// Detect and open the first available space navigator.
    ///
    /// Scans `/dev/input` with the default name patterns, probes for an
    /// LED indicator, and runs an initial calibration.
    ///
    /// # Errors
    ///
    /// - `DeviceNotFound`: no matching device on the system
    /// - `Io`: permission denied or other I/O errors when opening
    /// - `Read`: the initial calibration hit a fatal transport error
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use spacenav_input::SpaceNavigator;
    ///
    /// fn main() -> anyhow::Result<()> {
    ///     let nav = SpaceNavigator::open()?;
    ///     println!("device: {}", nav.device_path().display());
    ///     Ok(())
    /// }
    /// ```
    pub fn open() -> Result<Self> {
        Self::open_with_config(&Config::default())
    }

    /// Open a specific device node instead of scanning.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Config::default();
        config.device.path = path.as_ref().to_string_lossy().into_owned();
        Self::open_with_config(&config)
    }

    /// Open a device as described by `config`.
    ///
    /// An explicit `device.path` wins over discovery. Threshold,
    /// non-blocking mode, and the calibration window/on-open behavior all
    /// come from the config.
    pub fn open_with_config(config: &Config) -> Result<Self> {
        let transport = if config.device.path.is_empty() {
            EvdevTransport::discover(&config.device.name_patterns)?
        } else {
            EvdevTransport::open(&config.device.path)?
        };

        info!("Opened space navigator at: {}", transport.path().display());

        let mut nav = Self::from_transport(transport);
        nav.calibration_window = Duration::from_millis(config.calibration.window_ms);
        nav.set_threshold(config.filter.threshold);

        if config.device.nonblocking {
            nav.set_nonblocking(true)?;
        }
        if config.calibration.on_open {
            nav.calibrate()?;
        }

        Ok(nav)
    }

    /// Path of the device node backing this handle.
    #[must_use]
    pub fn device_path(&self) -> &Path {
        self.transport.path()
    }
}

impl<T: EventTransport> SpaceNavigator<T> {
    /// Wraps an already-open transport.
    ///
    /// This is the pluggable seam for custom locators and for tests: no
    /// discovery runs and no initial calibration is performed; call
    /// [`calibrate`](Self::calibrate) explicitly if wanted.
    pub fn from_transport(transport: T) -> Self {
        let indicator = transport.indicator_code();
        Self {
            transport,
            indicator,
            filter: DeadzoneFilter::new(),
            last_group: None,
            calibration_window: DEFAULT_CALIBRATION_WINDOW,
        }
    }

    /// Retrieve the next logical event.
    ///
    /// Consumes raw records until a button transition or a synchronized
    /// motion sample is complete. Returns `Ok(None)` when the transport is
    /// in non-blocking mode and no data is pending: a no-op poll that
    /// leaves all handle state untouched.
    ///
    /// # Errors
    ///
    /// `Error::Read` on any transport failure other than "no data
    /// available". Errors are surfaced immediately and never retried.
    pub fn next_event(&mut self) -> Result<Option<NavEvent>> {
        let mut assembler = SampleAssembler::new();

        loop {
            let record = match self.transport.read_record() {
                Ok(record) => record,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
                Err(e) => return Err(Error::Read(e)),
            };

            match assembler.fold(&record, &self.filter) {
                Decoded::Pending => {}
                Decoded::Button(event) => return Ok(Some(NavEvent::Button(event))),
                Decoded::Motion(mut event) => {
                    self.complete_axis_groups(&mut event);
                    return Ok(Some(NavEvent::Motion(event)));
                }
            }
        }
    }

    /// Estimate rest offsets by observing the stationary device.
    ///
    /// Blocks for at most the configured calibration window (100 ms by
    /// default). Whatever was observed when the window closes is committed
    /// as the new offset; an unresponsive device yields an all-zero,
    /// no-op calibration rather than an error. The deadzone threshold is
    /// suspended during sampling and restored afterwards on every path.
    ///
    /// # Errors
    ///
    /// `Error::Read`/`Error::Io` on fatal transport failures; the offset
    /// is left all-zero in that case.
    pub fn calibrate(&mut self) -> Result<()> {
        let saved_threshold = self.filter.threshold();
        self.filter.set_threshold(0);
        self.filter.set_offset([0; AXIS_COUNT]);

        let result = self.sample_rest();
        self.filter.set_threshold(saved_threshold);

        let offsets = result?.offsets();
        // single whole-array commit; never partially updated
        self.filter.set_offset(offsets);
        debug!("Calibration committed offsets {:?}", offsets);
        Ok(())
    }

    /// Deadline-bounded sampling loop behind [`calibrate`](Self::calibrate).
    ///
    /// Polls before every record read, so a readable descriptor (one whole
    /// kernel record) is the most the loop ever waits on and the deadline
    /// holds regardless of device responsiveness.
    fn sample_rest(&mut self) -> Result<RestSampler> {
        let deadline = Instant::now() + self.calibration_window;
        let mut sampler = RestSampler::new();
        let mut assembler = SampleAssembler::new();

        while !sampler.complete() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            if !self.transport.poll_readable(remaining)? {
                break;
            }

            let record = match self.transport.read_record() {
                Ok(record) => record,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
                Err(e) => return Err(Error::Read(e)),
            };

            if let Decoded::Motion(event) = assembler.fold(&record, &self.filter) {
                sampler.observe(&event);
            }
        }

        Ok(sampler)
    }

    /// True iff all six offsets are exactly zero.
    ///
    /// A true result means no offset correction is in effect: either the
    /// device genuinely rests at zero or calibration has never run. The
    /// two are indistinguishable under this definition.
    #[must_use]
    pub fn is_calibrated(&self) -> bool {
        self.filter.is_neutral()
    }

    /// Returns the committed per-axis offsets.
    #[must_use]
    pub fn offset(&self) -> [i32; AXIS_COUNT] {
        self.filter.offset()
    }

    /// Returns the deadzone threshold.
    #[must_use]
    pub fn threshold(&self) -> u16 {
        self.filter.threshold()
    }

    /// Sets the deadzone threshold applied to every axis after offset
    /// correction.
    pub fn set_threshold(&mut self, threshold: u16) {
        self.filter.set_threshold(threshold);
    }

    /// Last axis group that carried real data in a completed sync cycle.
    ///
    /// Button events never change this.
    #[must_use]
    pub fn last_axis_group(&self) -> Option<AxisGroup> {
        self.last_group
    }

    /// True when the device exposes an LED indicator.
    #[must_use]
    pub fn has_indicator(&self) -> bool {
        self.indicator.is_some()
    }

    /// Switch the LED indicator on or off.
    ///
    /// A device without an indicator capability makes this a successful
    /// no-op.
    ///
    /// # Errors
    ///
    /// `Error::IndicatorWrite` if the LED record could not be written; the
    /// handle itself stays valid.
    pub fn set_indicator(&mut self, on: bool) -> Result<()> {
        match self.indicator {
            Some(code) => self.transport.write_led(code, on).map_err(Error::IndicatorWrite),
            None => Ok(()),
        }
    }

    /// Switch the transport between blocking and non-blocking reads.
    ///
    /// In non-blocking mode [`next_event`](Self::next_event) returns
    /// `Ok(None)` instead of suspending; wait for readiness on the raw
    /// descriptor before calling again.
    pub fn set_nonblocking(&mut self, nonblocking: bool) -> Result<()> {
        self.transport.set_nonblocking(nonblocking).map_err(Error::Io)
    }

    /// Close the session.
    ///
    /// Equivalent to dropping the handle: turns the indicator off (best
    /// effort) and releases the transport. Rust ownership makes a second
    /// close unrepresentable.
    pub fn close(self) {}

    /// Axis-group completion at sync time.
    ///
    /// The group that did not report this cycle must emit exactly zero,
    /// and `last_group` flips so the next single-group cycle is not
    /// misread. Mask bits are pre-filter; liveness within a reported
    /// group is judged on post-filter values.
    fn complete_axis_groups(&mut self, event: &mut MotionEvent) {
        match (event.mask.has_translation(), event.mask.has_rotation()) {
            (true, true) => {
                let translation_live = event.axes[..3].iter().any(|&v| v != 0);
                let rotation_live = event.axes[3..].iter().any(|&v| v != 0);
                match (translation_live, rotation_live) {
                    (true, false) => self.last_group = Some(AxisGroup::Translation),
                    (false, true) => self.last_group = Some(AxisGroup::Rotation),
                    _ => {}
                }
            }
            (true, false) => {
                event.axes[3..].fill(0);
                self.last_group = Some(AxisGroup::Rotation);
            }
            (false, true) => {
                event.axes[..3].fill(0);
                self.last_group = Some(AxisGroup::Translation);
            }
            (false, false) => {}
        }
    }
}

impl<T: EventTransport> Drop for SpaceNavigator<T> {
    fn drop(&mut self) {
        if let Err(e) = self.set_indicator(false) {
            debug!("Failed to switch indicator off on close: {}", e);
        }
    }
}

impl<T: EventTransport + AsRawFd> AsRawFd for SpaceNavigator<T> {
    fn as_raw_fd(&self) -> RawFd {
        self.transport.as_raw_fd()
    }
}

impl<T: EventTransport> std::fmt::Debug for SpaceNavigator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpaceNavigator")
            .field("indicator", &self.indicator)
            .field("threshold", &self.filter.threshold())
            .field("offset", &self.filter.offset())
            .field("last_group", &self.last_group)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::stream_trait::mocks::{key, rel, sync, MockTransport, Step};
    use std::io::ErrorKind;

    fn navigator(mock: &MockTransport) -> SpaceNavigator<MockTransport> {
        SpaceNavigator::from_transport(mock.clone())
    }

    // ==================== Event Retrieval Tests ====================

    #[test]
    fn test_translation_only_cycle_zeroes_rotation() {
        let mock = MockTransport::new();
        mock.push_records(&[rel(0, 10), rel(1, -4), rel(2, 2), sync()]);
        let mut nav = navigator(&mock);

        match nav.next_event().unwrap() {
            Some(NavEvent::Motion(event)) => {
                assert_eq!(event.axes, [10, -4, 2, 0, 0, 0]);
                assert_eq!(event.rotation(), [0, 0, 0]);
            }
            other => panic!("expected motion, got {:?}", other),
        }
        assert_eq!(nav.last_axis_group(), Some(AxisGroup::Rotation));
    }

    #[test]
    fn test_rotation_only_cycle_zeroes_translation() {
        let mock = MockTransport::new();
        mock.push_records(&[rel(3, 7), rel(5, -9), sync()]);
        let mut nav = navigator(&mock);

        match nav.next_event().unwrap() {
            Some(NavEvent::Motion(event)) => {
                assert_eq!(event.axes, [0, 0, 0, 7, 0, -9]);
            }
            other => panic!("expected motion, got {:?}", other),
        }
        assert_eq!(nav.last_axis_group(), Some(AxisGroup::Translation));
    }

    #[test]
    fn test_alternating_group_cycles() {
        let mock = MockTransport::new();
        mock.push_records(&[rel(0, 5), sync(), rel(4, 6), sync()]);
        let mut nav = navigator(&mock);

        nav.next_event().unwrap();
        assert_eq!(nav.last_axis_group(), Some(AxisGroup::Rotation));

        match nav.next_event().unwrap() {
            Some(NavEvent::Motion(event)) => {
                // no translation leaks from the previous cycle
                assert_eq!(event.axes, [0, 0, 0, 0, 6, 0]);
            }
            other => panic!("expected motion, got {:?}", other),
        }
        assert_eq!(nav.last_axis_group(), Some(AxisGroup::Translation));
    }

    #[test]
    fn test_both_groups_marks_the_live_one() {
        let mock = MockTransport::new();
        // rotation reports but filters to zero; translation carries signal
        mock.push_records(&[rel(0, 30), rel(3, 2), sync()]);
        let mut nav = navigator(&mock);
        nav.set_threshold(5);

        match nav.next_event().unwrap() {
            Some(NavEvent::Motion(event)) => {
                assert_eq!(event.axes, [25, 0, 0, 0, 0, 0]);
                assert!(event.mask.has_rotation());
            }
            other => panic!("expected motion, got {:?}", other),
        }
        assert_eq!(nav.last_axis_group(), Some(AxisGroup::Translation));
    }

    #[test]
    fn test_empty_sync_cycle_changes_nothing() {
        let mock = MockTransport::new();
        mock.push_records(&[rel(0, 5), sync(), sync()]);
        let mut nav = navigator(&mock);

        nav.next_event().unwrap();
        let group_after_first = nav.last_axis_group();

        match nav.next_event().unwrap() {
            Some(NavEvent::Motion(event)) => {
                assert!(event.mask.is_empty());
                assert_eq!(event.axes, [0; AXIS_COUNT]);
            }
            other => panic!("expected motion, got {:?}", other),
        }
        assert_eq!(nav.last_axis_group(), group_after_first);
    }

    #[test]
    fn test_deadzone_scenario_through_the_handle() {
        let mock = MockTransport::new();
        mock.push_records(&[rel(0, 105), rel(1, 3), sync()]);
        let mut nav = navigator(&mock);
        nav.filter.set_offset([100, 0, 0, 0, 0, 0]);
        nav.set_threshold(5);

        match nav.next_event().unwrap() {
            Some(NavEvent::Motion(event)) => {
                assert_eq!(event.axes, [0; AXIS_COUNT]);
                assert!(event.mask.contains(0));
                assert!(event.mask.contains(1));
            }
            other => panic!("expected motion, got {:?}", other),
        }
    }

    #[test]
    fn test_button_preempts_motion_and_keeps_group_memory() {
        let mock = MockTransport::new();
        mock.push_records(&[rel(0, 5), sync(), rel(1, 3)]);
        mock.push(Step::Record(key(256, true)));
        let mut nav = navigator(&mock);

        nav.next_event().unwrap();
        let group = nav.last_axis_group();

        match nav.next_event().unwrap() {
            Some(NavEvent::Button(event)) => {
                assert_eq!(event.code, 256);
                assert!(event.pressed);
            }
            other => panic!("expected button, got {:?}", other),
        }
        // button events never touch the axis-group memory
        assert_eq!(nav.last_axis_group(), group);
    }

    #[test]
    fn test_no_data_is_a_no_op_poll() {
        let mock = MockTransport::new();
        let mut nav = navigator(&mock);

        assert!(nav.next_event().unwrap().is_none());
        assert_eq!(nav.last_axis_group(), None);
    }

    #[test]
    fn test_partial_sample_then_no_data() {
        let mock = MockTransport::new();
        mock.push_records(&[rel(0, 9)]);
        let mut nav = navigator(&mock);

        // drained mid-sample: NoData, and the partial data is discarded
        assert!(nav.next_event().unwrap().is_none());

        mock.push_records(&[sync()]);
        match nav.next_event().unwrap() {
            Some(NavEvent::Motion(event)) => assert_eq!(event.axes, [0; AXIS_COUNT]),
            other => panic!("expected motion, got {:?}", other),
        }
    }

    #[test]
    fn test_read_error_is_fatal() {
        let mock = MockTransport::new();
        mock.push(Step::Error(ErrorKind::BrokenPipe));
        let mut nav = navigator(&mock);

        match nav.next_event() {
            Err(Error::Read(e)) => assert_eq!(e.kind(), ErrorKind::BrokenPipe),
            other => panic!("expected read error, got {:?}", other),
        }
    }

    // ==================== Threshold Tests ====================

    #[test]
    fn test_threshold_roundtrip() {
        let mock = MockTransport::new();
        let mut nav = navigator(&mock);

        for value in [0u16, 1, 5, 1000] {
            nav.set_threshold(value);
            assert_eq!(nav.threshold(), value);
        }
    }

    #[test]
    fn test_zero_threshold_passes_unit_values() {
        let mock = MockTransport::new();
        mock.push_records(&[rel(0, 1), sync()]);
        let mut nav = navigator(&mock);
        nav.set_threshold(0);

        match nav.next_event().unwrap() {
            Some(NavEvent::Motion(event)) => assert_eq!(event.axes[0], 1),
            other => panic!("expected motion, got {:?}", other),
        }
    }

    // ==================== Calibration Tests ====================

    #[test]
    fn test_calibrate_commits_both_groups() {
        let mock = MockTransport::new();
        mock.push_records(&[
            rel(0, 5),
            rel(1, -2),
            rel(2, 1),
            sync(),
            rel(3, 3),
            rel(4, 4),
            rel(5, -1),
            sync(),
        ]);
        let mut nav = navigator(&mock);
        nav.set_threshold(7);

        nav.calibrate().unwrap();

        assert_eq!(nav.offset(), [5, -2, 1, 3, 4, -1]);
        assert_eq!(nav.threshold(), 7, "threshold restored after sampling");
        assert!(!nav.is_calibrated());
    }

    #[test]
    fn test_calibrate_with_silent_rotation() {
        let mock = MockTransport::new();
        mock.push_records(&[rel(0, 12), sync()]);
        let mut nav = navigator(&mock);

        nav.calibrate().unwrap();

        assert_eq!(nav.offset(), [12, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_calibrate_unresponsive_device_is_a_no_op() {
        let mock = MockTransport::new();
        let mut nav = navigator(&mock);
        nav.set_threshold(3);

        nav.calibrate().unwrap();

        assert_eq!(nav.offset(), [0; AXIS_COUNT]);
        assert!(nav.is_calibrated());
        assert_eq!(nav.threshold(), 3);
    }

    #[test]
    fn test_calibrate_stops_when_stream_goes_quiet() {
        let mock = MockTransport::new();
        mock.push_records(&[rel(1, 4), sync()]);
        mock.push(Step::NoData);
        mock.push_records(&[rel(3, 9), sync()]);
        let mut nav = navigator(&mock);

        nav.calibrate().unwrap();

        // sampling ends at the quiet gap; the later rotation cycle is not
        // consumed
        assert_eq!(nav.offset(), [0, 4, 0, 0, 0, 0]);
    }

    #[test]
    fn test_calibrate_restores_threshold_on_error() {
        let mock = MockTransport::new();
        mock.push(Step::Error(ErrorKind::BrokenPipe));
        let mut nav = navigator(&mock);
        nav.set_threshold(9);

        assert!(nav.calibrate().is_err());

        assert_eq!(nav.threshold(), 9);
        assert_eq!(nav.offset(), [0; AXIS_COUNT]);
    }

    #[test]
    fn test_calibrate_then_filter_uses_new_offsets() {
        let mock = MockTransport::new();
        mock.push_records(&[rel(0, 100), sync()]);
        let mut nav = navigator(&mock);
        nav.set_threshold(5);
        nav.calibrate().unwrap();

        mock.push_records(&[rel(0, 105), sync()]);
        match nav.next_event().unwrap() {
            Some(NavEvent::Motion(event)) => assert_eq!(event.axes[0], 0),
            other => panic!("expected motion, got {:?}", other),
        }
    }

    #[test]
    fn test_is_calibrated_tracks_neutral_offsets() {
        let mock = MockTransport::new();
        let mut nav = navigator(&mock);
        assert!(nav.is_calibrated());

        nav.filter.set_offset([0, 0, 1, 0, 0, 0]);
        assert!(!nav.is_calibrated());
    }

    // ==================== Indicator Tests ====================

    #[test]
    fn test_set_indicator_writes_led_record() {
        let mock = MockTransport::with_indicator(0);
        let mut nav = navigator(&mock);

        nav.set_indicator(true).unwrap();
        nav.set_indicator(false).unwrap();

        assert_eq!(mock.get_led_writes(), vec![(0, true), (0, false)]);
    }

    #[test]
    fn test_set_indicator_without_capability_is_ok() {
        let mock = MockTransport::new();
        let mut nav = navigator(&mock);

        assert!(!nav.has_indicator());
        assert!(nav.set_indicator(true).is_ok());
        assert!(mock.get_led_writes().is_empty());
    }

    #[test]
    fn test_indicator_write_error_keeps_handle_usable() {
        let mock = MockTransport::with_indicator(0);
        mock.set_write_error(ErrorKind::PermissionDenied);
        let mut nav = navigator(&mock);

        assert!(matches!(
            nav.set_indicator(true),
            Err(Error::IndicatorWrite(_))
        ));

        mock.push_records(&[rel(0, 2), sync()]);
        assert!(nav.next_event().unwrap().is_some());
    }

    #[test]
    fn test_drop_switches_indicator_off() {
        let mock = MockTransport::with_indicator(3);
        let nav = navigator(&mock);
        drop(nav);

        assert_eq!(mock.get_led_writes(), vec![(3, false)]);
    }

    #[test]
    fn test_close_switches_indicator_off() {
        let mock = MockTransport::with_indicator(1);
        let nav = navigator(&mock);
        nav.close();

        assert_eq!(mock.get_led_writes(), vec![(1, false)]);
    }

    // ==================== Mode Tests ====================

    #[test]
    fn test_set_nonblocking_reaches_transport() {
        let mock = MockTransport::new();
        let mut nav = navigator(&mock);

        nav.set_nonblocking(true).unwrap();
        assert!(mock.is_nonblocking());

        nav.set_nonblocking(false).unwrap();
        assert!(!mock.is_nonblocking());
    }

    // Integration test - only runs with real hardware
    #[test]
    #[ignore]
    fn test_open_with_real_hardware() {
        // This test requires a connected space navigator
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();

        let nav = SpaceNavigator::open().expect("device not found");
        assert!(nav.device_path().starts_with("/dev/input"));
    }
}
