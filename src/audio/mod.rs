//! Microphone capture and sound-level estimation.
//!
//! Opens a raw PCM input stream via CPAL and reduces each block of samples to
//! an uncalibrated decibel estimate (peak-based, not RMS) on a fixed cadence.
//! Readings are pushed to the presenter; all capture failures are handled
//! locally and never surface past this module.

use std::time::Duration;

/// Capture sample rate (Hz).
pub const SAMPLE_RATE: u32 = 44_100;

/// Fixed pause between level readings. Trades responsiveness for CPU cost.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

mod dispatch;
mod level;
mod sampler;
#[cfg(test)]
mod tests;

pub use level::{decibels, peak_magnitude};
pub use sampler::Sampler;
