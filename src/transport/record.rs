//! # Raw Record Classification
//!
//! The kernel input-event stream delivers fixed-size records that carry a
//! semantic channel, a code, a signed value, and a timestamp. [`RawRecord`]
//! is the transport-neutral form of one such record; [`Channel`] is the
//! classification the decoder switches on.

use evdev::{InputEvent, InputEventKind};
use std::time::SystemTime;

/// Semantic channel of a raw input record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Relative-axis motion delta (EV_REL)
    Relative,
    /// Absolute-axis motion report (EV_ABS)
    Absolute,
    /// Button transition (EV_KEY)
    Key,
    /// LED state report (EV_LED)
    Led,
    /// Synchronization marker: all axis records for one instant delivered
    Sync,
    /// Any other channel; ignored by the decoder
    Other,
}

/// One raw record as read from the transport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRecord {
    /// Device-reported timestamp of the record.
    pub time: SystemTime,
    /// Semantic channel.
    pub channel: Channel,
    /// Channel-specific code (axis index, key code, LED index).
    pub code: u16,
    /// Signed value (axis delta, key state, LED state).
    pub value: i32,
}

impl RawRecord {
    /// Returns the logical axis index (0-5) this record addresses, or
    /// `None` if the record is not a motion record for a mapped axis.
    ///
    /// REL_X..REL_RZ and ABS_X..ABS_RZ share codes 0-5, which map directly
    /// onto the six logical axes.
    #[must_use]
    pub fn axis_index(&self) -> Option<usize> {
        match self.channel {
            Channel::Relative | Channel::Absolute if self.code < 6 => Some(self.code as usize),
            _ => None,
        }
    }
}

impl From<&InputEvent> for RawRecord {
    fn from(event: &InputEvent) -> Self {
        let channel = match event.kind() {
            InputEventKind::RelAxis(_) => Channel::Relative,
            InputEventKind::AbsAxis(_) => Channel::Absolute,
            InputEventKind::Key(_) => Channel::Key,
            InputEventKind::Led(_) => Channel::Led,
            InputEventKind::Synchronization(_) => Channel::Sync,
            _ => Channel::Other,
        };

        Self {
            time: event.timestamp(),
            channel,
            code: event.code(),
            value: event.value(),
        }
    }
}
