//! # Rest-Offset Calibration
//!
//! Estimates per-axis zero offsets by passively observing raw motion
//! samples while the device is assumed stationary. Translation and
//! rotation triples are captured independently because the hardware
//! reports them in alternating sync cycles; an unobserved group simply
//! stays at zero.
//!
//! The sampling loop itself lives on
//! [`SpaceNavigator::calibrate`](crate::navigator::SpaceNavigator::calibrate);
//! this module holds the accumulation state and the bounded window.

use std::time::Duration;

use crate::navigator::event::{MotionEvent, AXIS_COUNT};

/// Default bound on how long calibration may observe the device.
pub const DEFAULT_CALIBRATION_WINDOW: Duration = Duration::from_millis(100);

/// Accumulates rest triples observed during the calibration window.
///
/// The first observation of each axis group wins; later samples of the
/// same group are ignored.
#[derive(Debug, Default)]
pub(crate) struct RestSampler {
    translation: Option<[i32; 3]>,
    rotation: Option<[i32; 3]>,
}

impl RestSampler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records the triples a motion sample carries, keyed off its mask.
    pub(crate) fn observe(&mut self, event: &MotionEvent) {
        if event.mask.has_translation() && self.translation.is_none() {
            self.translation = Some(event.translation());
        }
        if event.mask.has_rotation() && self.rotation.is_none() {
            self.rotation = Some(event.rotation());
        }
    }

    /// True once both groups have been observed.
    pub(crate) fn complete(&self) -> bool {
        self.translation.is_some() && self.rotation.is_some()
    }

    /// Assembles the offset array to commit; unobserved groups stay zero.
    pub(crate) fn offsets(&self) -> [i32; AXIS_COUNT] {
        let mut offsets = [0; AXIS_COUNT];
        if let Some(t) = self.translation {
            offsets[..3].copy_from_slice(&t);
        }
        if let Some(r) = self.rotation {
            offsets[3..].copy_from_slice(&r);
        }
        offsets
    }
}
