//! # Motion Event Normalizer
//!
//! Space navigator session handling.
//!
//! This module handles:
//! - Reassembling per-axis kernel records into six-axis motion samples
//! - Offset calibration against the device's rest position
//! - Deadzone filtering of every decoded axis value
//! - Axis-group bookkeeping so the group a cycle omits emits exact zeros
//! - Button transitions and the LED indicator

pub mod calibration;
mod decoder;
pub mod device;
pub mod event;
pub mod filter;

pub use device::SpaceNavigator;
pub use event::{AxisGroup, AxisMask, ButtonEvent, MotionEvent, NavEvent};
pub use filter::DeadzoneFilter;
