//! # Raw Event Decoder
//!
//! Folds raw transport records into logical events. Per-axis motion
//! records accumulate into an in-progress six-axis sample until a sync
//! marker finalizes it; button records preempt and discard whatever was
//! accumulated. Deadzone filtering is applied inline as each axis value is
//! decoded.

use crate::navigator::event::{AxisMask, ButtonEvent, MotionEvent, AXIS_COUNT};
use crate::navigator::filter::DeadzoneFilter;
use crate::transport::record::{Channel, RawRecord};

/// Outcome of folding one raw record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Decoded {
    /// Record consumed; the sample is still in progress
    Pending,
    /// A button transition finished this call
    Button(ButtonEvent),
    /// A sync marker finalized a motion sample
    Motion(MotionEvent),
}

/// In-progress motion sample.
///
/// Starts empty (all axes zero, empty mask) and resets itself every time
/// an event is finalized, so a silent axis group always emits exactly
/// zero, never a stale value from an earlier cycle.
#[derive(Debug)]
pub(crate) struct SampleAssembler {
    axes: [i32; AXIS_COUNT],
    mask: AxisMask,
}

impl SampleAssembler {
    pub(crate) fn new() -> Self {
        Self {
            axes: [0; AXIS_COUNT],
            mask: AxisMask::empty(),
        }
    }

    /// Classifies one raw record and folds it into the sample.
    pub(crate) fn fold(&mut self, record: &RawRecord, filter: &DeadzoneFilter) -> Decoded {
        match record.channel {
            Channel::Relative | Channel::Absolute => {
                if let Some(axis) = record.axis_index() {
                    self.axes[axis] = filter.apply(axis, record.value);
                    // mask reflects "axis reported", pre-filter
                    self.mask.set(axis);
                }
                Decoded::Pending
            }

            Channel::Key => {
                // Buttons preempt motion assembly; the partial sample is dropped
                self.reset();
                Decoded::Button(ButtonEvent {
                    time: record.time,
                    code: record.code,
                    pressed: record.value != 0,
                })
            }

            Channel::Sync => {
                let event = MotionEvent {
                    time: record.time,
                    mask: self.mask,
                    axes: self.axes,
                };
                self.reset();
                Decoded::Motion(event)
            }

            Channel::Led | Channel::Other => Decoded::Pending,
        }
    }

    fn reset(&mut self) {
        self.axes = [0; AXIS_COUNT];
        self.mask = AxisMask::empty();
    }
}
