//! # Logical Event Types
//!
//! Events produced by the driver after raw-record reassembly: six-axis
//! motion samples and button transitions.
//!
//! ## Axis Layout
//!
//! | Index | Axis | Kernel code |
//! |-------|---------------|-------------|
//! | 0 | Translation X | REL_X / ABS_X |
//! | 1 | Translation Y | REL_Y / ABS_Y |
//! | 2 | Translation Z | REL_Z / ABS_Z |
//! | 3 | Rotation X | REL_RX / ABS_RX |
//! | 4 | Rotation Y | REL_RY / ABS_RY |
//! | 5 | Rotation Z | REL_RZ / ABS_RZ |
//!
//! The device reports translation and rotation in alternating sync cycles;
//! [`AxisMask`] records which axes actually reported in a given cycle so
//! the silent group can be zeroed correctly.

use std::time::SystemTime;

/// Number of logical axes on a 6-DoF device.
pub const AXIS_COUNT: usize = 6;

/// Mask bits covering the translation axes (0-2).
const TRANSLATION_BITS: u8 = 0b000_0111;

/// Mask bits covering the rotation axes (3-5).
const ROTATION_BITS: u8 = 0b011_1000;

/// One of the two logical axis triples a device may report independently
/// per update cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisGroup {
    /// Translation X/Y/Z (axes 0-2)
    Translation,
    /// Rotation X/Y/Z (axes 3-5)
    Rotation,
}

/// Bitset over the six axes of a motion sample.
///
/// A bit is set when a raw record for that axis was decoded in the current
/// sync cycle, *before* deadzone filtering and regardless of the record's
/// value. The numeric values in [`MotionEvent::axes`] are post-filter, so a
/// sample can carry a set mask bit alongside a zero axis value.
///
/// # Examples
///
/// ```
/// use spacenav_input::navigator::event::AxisMask;
///
/// let mut mask = AxisMask::empty();
/// mask.set(0);
/// mask.set(4);
/// assert!(mask.has_translation());
/// assert!(mask.has_rotation());
/// assert!(!mask.contains(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisMask(u8);

impl AxisMask {
    /// Creates an empty mask (no axes reported).
    #[must_use]
    pub fn empty() -> Self {
        Self(0)
    }

    /// Marks `axis` (0-5) as having reported this cycle.
    ///
    /// Out-of-range indices are ignored.
    pub fn set(&mut self, axis: usize) {
        if axis < AXIS_COUNT {
            self.0 |= 1 << axis;
        }
    }

    /// Returns true if `axis` (0-5) reported this cycle.
    #[must_use]
    pub fn contains(&self, axis: usize) -> bool {
        axis < AXIS_COUNT && self.0 & (1 << axis) != 0
    }

    /// Returns true if no axis reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if any translation axis (0-2) reported.
    #[must_use]
    pub fn has_translation(&self) -> bool {
        self.0 & TRANSLATION_BITS != 0
    }

    /// Returns true if any rotation axis (3-5) reported.
    #[must_use]
    pub fn has_rotation(&self) -> bool {
        self.0 & ROTATION_BITS != 0
    }

    /// Raw bit representation (bit N = axis N).
    #[must_use]
    pub fn bits(&self) -> u8 {
        self.0
    }
}

/// A completed six-axis motion sample.
///
/// Emitted once per sync cycle. All six axes are always populated: the
/// group that did not report this cycle is exactly zero, never a stale
/// value from an earlier cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionEvent {
    /// Device-reported time of the sync record that completed this sample.
    pub time: SystemTime,
    /// Axes that reported this cycle (pre-filter).
    pub mask: AxisMask,
    /// Calibrated, deadzone-filtered axis values.
    pub axes: [i32; AXIS_COUNT],
}

impl MotionEvent {
    /// The translation triple (axes 0-2).
    #[must_use]
    pub fn translation(&self) -> [i32; 3] {
        [self.axes[0], self.axes[1], self.axes[2]]
    }

    /// The rotation triple (axes 3-5).
    #[must_use]
    pub fn rotation(&self) -> [i32; 3] {
        [self.axes[3], self.axes[4], self.axes[5]]
    }
}

/// A button press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    /// Device-reported time of the key record.
    pub time: SystemTime,
    /// Kernel key code of the button.
    pub code: u16,
    /// True for press, false for release.
    pub pressed: bool,
}

/// A logical event produced per call to
/// [`SpaceNavigator::next_event`](crate::navigator::SpaceNavigator::next_event).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavEvent {
    /// A synchronized six-axis motion sample
    Motion(MotionEvent),
    /// A button transition
    Button(ButtonEvent),
}

impl NavEvent {
    /// Device-reported time of the record that completed this event.
    #[must_use]
    pub fn time(&self) -> SystemTime {
        match self {
            NavEvent::Motion(m) => m.time,
            NavEvent::Button(b) => b.time,
        }
    }
}
