//! # Spacenav Input
//!
//! Calibrated, deadzone-filtered event driver for 3Dconnexion space
//! navigator devices on Linux.
//!
//! The kernel input-event stream delivers independent per-axis deltas,
//! button records, and a synchronization marker. This library reassembles
//! them into stable logical events: six-axis motion samples with a running
//! calibration offset and a symmetric deadzone applied, and button
//! press/release transitions.

pub mod config;
pub mod error;
pub mod navigator;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use navigator::{AxisGroup, AxisMask, ButtonEvent, MotionEvent, NavEvent, SpaceNavigator};
pub use transport::{EvdevTransport, EventTransport};
