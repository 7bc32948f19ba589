//! 60 GHz FMCW radar presence detection.
//!
//! Range-FFTs each chirp, runs a frame-differencing macro (gross motion)
//! track and a slow-time Doppler micro (breathing) track over a cyclic
//! history of range spectra, and drives a small presence state machine
//! that emits at most one state-changing event per processed frame.
//! `aoa` adds a standalone single-target range + angle-of-arrival estimate
//! from the same antenna geometry.

pub mod aoa;
pub mod capture;
pub mod config;
pub mod constants;
pub mod detector;
pub mod error;
pub mod fft;
pub mod filters;
pub mod frame;
pub mod history_ring;
pub mod macro_detector;
pub mod micro_detector;
pub mod state;

pub use config::{Config, PresenceMode};
pub use detector::PresenceDetector;
pub use error::{DetectorError, Result};
pub use state::{Event, PresenceState};
