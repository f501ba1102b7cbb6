//! Latest-reading state shared between the sampling worker and the display.
//!
//! The presenter owns the two-state recording machine and the most recent
//! decibel value. The worker writes through a relaxed atomic cell; the UI
//! polls derived values. No error states exist here: failures stay inside the
//! sampler and show up only as an absence of readings.

use crate::log_debug;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;

/// Rounded reading above which the display flags a dangerous level (dB).
pub const DANGER_DB: i32 = 70;
/// Rounded reading below which the level is considered safe (dB).
pub const SAFE_DB: i32 = 40;
/// Full-scale reading for the progress bar (dB).
pub const FULL_SCALE_DB: f32 = 150.0;

/// One sampling session: emit a reading per tick through `on_reading` while
/// `is_active` holds, then release the capture resources before returning.
pub trait LevelSource: Send + Sync {
    fn run(&self, on_reading: &(dyn Fn(f32) + Sync), is_active: &(dyn Fn() -> bool + Sync));
}

/// Recording state observed by the sampling loop as its continuation condition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MeterState {
    Idle,
    Recording,
}

/// Color band for the level bar.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LevelBand {
    Safe,
    Caution,
    Danger,
}

struct MeterShared {
    recording: AtomicBool,
    level_bits: AtomicU32,
}

impl MeterShared {
    fn new() -> Self {
        Self {
            recording: AtomicBool::new(false),
            level_bits: AtomicU32::new(0.0f32.to_bits()),
        }
    }

    fn set_level(&self, db: f32) {
        self.level_bits.store(db.to_bits(), Ordering::Relaxed);
    }

    fn level(&self) -> f32 {
        f32::from_bits(self.level_bits.load(Ordering::Relaxed))
    }

    fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Relaxed)
    }
}

/// Worker handle for one sampling session.
struct SamplerJob {
    handle: Option<thread::JoinHandle<()>>,
}

pub struct LevelPresenter {
    shared: Arc<MeterShared>,
    job: Option<SamplerJob>,
}

impl LevelPresenter {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(MeterShared::new()),
            job: None,
        }
    }

    pub fn state(&self) -> MeterState {
        if self.shared.is_recording() {
            MeterState::Recording
        } else {
            MeterState::Idle
        }
    }

    /// `Idle -> Recording`: spawn the sampling worker with a callback that
    /// stores readings and a continuation predicate bound to this state.
    /// A no-op while already recording. Returns whether a session started.
    ///
    /// A rapid stop/start may wait out the previous loop's final tick here so
    /// at most one loop is ever active against the stream.
    pub fn start(&mut self, source: Arc<dyn LevelSource>) -> bool {
        if self.shared.is_recording() {
            return false;
        }
        self.join_worker();

        self.shared.recording.store(true, Ordering::Relaxed);
        let shared = self.shared.clone();
        let handle = thread::spawn(move || {
            source.run(&|db| shared.set_level(db), &|| shared.is_recording());
        });
        self.job = Some(SamplerJob {
            handle: Some(handle),
        });
        true
    }

    /// `Recording -> Idle`. The worker observes the flag on its next loop
    /// check (up to one tick later) and releases the stream itself. A no-op
    /// while idle. Returns whether a transition happened.
    pub fn stop(&mut self) -> bool {
        if !self.shared.is_recording() {
            return false;
        }
        self.shared.recording.store(false, Ordering::Relaxed);
        true
    }

    /// Join the worker once it has wound down. Never blocks on a live loop;
    /// the UI calls this every frame.
    pub fn poll_job(&mut self) {
        let finished = self
            .job
            .as_ref()
            .and_then(|job| job.handle.as_ref())
            .map(|handle| handle.is_finished())
            .unwrap_or(false);
        if finished {
            self.join_worker();
        }
    }

    /// Stop and wait for the worker to release the stream.
    pub fn shutdown(&mut self) {
        self.stop();
        self.join_worker();
    }

    pub fn has_active_job(&self) -> bool {
        self.job.is_some()
    }

    pub fn last_reading(&self) -> f32 {
        self.shared.level()
    }

    /// Rounded reading for the headline readout.
    pub fn display_value(&self) -> i32 {
        self.shared.level().round() as i32
    }

    pub fn is_dangerous(&self) -> bool {
        self.display_value() > DANGER_DB
    }

    /// Bar fill in `[0, 1]` however large the reading grows.
    pub fn normalized_level(&self) -> f32 {
        (self.shared.level() / FULL_SCALE_DB).clamp(0.0, 1.0)
    }

    /// Three-band classification of the rounded reading. The danger band
    /// holds exactly when [`LevelPresenter::is_dangerous`] does.
    pub fn band(&self) -> LevelBand {
        let value = self.display_value();
        if value < SAFE_DB {
            LevelBand::Safe
        } else if value <= DANGER_DB {
            LevelBand::Caution
        } else {
            LevelBand::Danger
        }
    }

    fn join_worker(&mut self) {
        if let Some(mut job) = self.job.take() {
            if let Some(handle) = job.handle.take() {
                if handle.join().is_err() {
                    log_debug("sampling worker panicked");
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn set_reading_for_tests(&self, db: f32) {
        self.shared.set_level(db);
    }
}

impl Default for LevelPresenter {
    fn default() -> Self {
        Self::new()
    }
}
