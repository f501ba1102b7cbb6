//! System microphone sampling via CPAL.
//!
//! Handles device enumeration, format conversion, and the 200 ms polling loop
//! that turns raw PCM blocks into decibel readings.

use super::dispatch::BlockDispatcher;
use super::level::block_reading;
use super::{POLL_INTERVAL, SAMPLE_RATE};
use crate::log_debug;
use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, SampleRate, StreamConfig, SupportedBufferSize};
use crossbeam_channel::{bounded, RecvTimeoutError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

/// Audio input device wrapper.
///
/// Owns the device handle; the input stream itself only exists inside
/// [`Sampler::run`], for the duration of a single sampling session.
pub struct Sampler {
    device: cpal::Device,
}

impl Sampler {
    /// List microphone names so the CLI can expose a human-friendly selector.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host.input_devices().context("no input devices available")?;
        let mut names = Vec::new();
        for device in devices {
            if let Ok(name) = device.name() {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Create a sampler, optionally forcing a specific device so users can pick
    /// the right microphone when the machine exposes multiple inputs.
    pub fn new(preferred_device: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        let device = match preferred_device {
            Some(name) => {
                let mut devices = host.input_devices().context("no input devices available")?;
                devices
                    .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                    .ok_or_else(|| anyhow!("input device '{name}' not found"))?
            }
            None => host
                .default_input_device()
                .context("no default input device available")?,
        };
        Ok(Self { device })
    }

    /// Get the name of the active sampling device.
    pub fn device_name(&self) -> String {
        self.device
            .name()
            .unwrap_or_else(|_| "Unknown Device".to_string())
    }

    /// Run one sampling session: while `is_active()` holds, read one block of
    /// samples per tick, reduce it to a decibel reading, and push it through
    /// `on_reading`, sleeping [`POLL_INTERVAL`] between iterations.
    ///
    /// All failures are absorbed here. An unsupported configuration or a
    /// stream that will not open ends the session before any reading is
    /// emitted; the display layer only ever observes the absence of readings.
    pub fn run(&self, on_reading: &(dyn Fn(f32) + Sync), is_active: &(dyn Fn() -> bool + Sync)) {
        if let Err(err) = self.run_inner(on_reading, is_active) {
            log_debug(&format!(
                "sampling session aborted: {err:#}. {}",
                mic_permission_hint()
            ));
        }
    }

    fn run_inner(
        &self,
        on_reading: &(dyn Fn(f32) + Sync),
        is_active: &(dyn Fn() -> bool + Sync),
    ) -> Result<()> {
        let (device_config, format, block_samples) = self.capture_config()?;
        let channels = usize::from(device_config.channels.max(1));
        let device_name = self.device_name();

        // cpal delivers samples on a callback thread; a capacity-1 channel
        // keeps exactly one block read in flight and favors the freshest data.
        let (sender, receiver) = bounded::<Vec<i16>>(1);
        let dropped = Arc::new(AtomicUsize::new(0));
        let dispatcher = Arc::new(Mutex::new(BlockDispatcher::new(
            block_samples,
            sender,
            dropped.clone(),
        )));

        // Keep the error callback quiet in the UI and mirror issues into the log.
        let err_fn = |err| log_debug(&format!("audio_stream_error: {err}"));

        let stream = match format {
            SampleFormat::F32 => {
                let dispatcher = dispatcher.clone();
                let dropped = dropped.clone();
                self.device.build_input_stream(
                    &device_config,
                    move |data: &[f32], _| {
                        if let Ok(mut pump) = dispatcher.try_lock() {
                            pump.push(data, channels, |sample| sample);
                        } else {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )?
            }
            SampleFormat::I16 => {
                let dispatcher = dispatcher.clone();
                let dropped = dropped.clone();
                self.device.build_input_stream(
                    &device_config,
                    move |data: &[i16], _| {
                        if let Ok(mut pump) = dispatcher.try_lock() {
                            pump.push(data, channels, |sample| f32::from(sample) / 32_768.0);
                        } else {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )?
            }
            SampleFormat::U16 => {
                let dispatcher = dispatcher.clone();
                let dropped = dropped.clone();
                self.device.build_input_stream(
                    &device_config,
                    move |data: &[u16], _| {
                        if let Ok(mut pump) = dispatcher.try_lock() {
                            pump.push(data, channels, |sample| {
                                (f32::from(sample) - 32_768.0) / 32_768.0
                            });
                        } else {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )?
            }
            other => return Err(anyhow!("unsupported sample format: {other:?}")),
        };

        stream.play().context("failed to start capture")?;
        tracing::info!(device = %device_name, block_samples, "capture_started");

        let mut readings = 0usize;
        while is_active() {
            match receiver.recv_timeout(POLL_INTERVAL) {
                Ok(block) => {
                    if let Some(db) = block_reading(&block) {
                        on_reading(db);
                        readings += 1;
                    }
                }
                // No data this tick; skip processing but keep looping.
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            thread::sleep(POLL_INTERVAL);
        }

        // Terminal, one-time release: runs on the worker regardless of which
        // context flipped the flag.
        if let Err(err) = stream.pause() {
            log_debug(&format!("failed to pause audio stream: {err}"));
        }
        drop(stream);

        let dropped_total = dropped.load(Ordering::Relaxed);
        tracing::info!(readings, dropped_total, "capture_stopped");
        if readings == 0 {
            log_debug(&format!(
                "no samples captured from '{device_name}'; check microphone permissions and availability. {}",
                mic_permission_hint()
            ));
        }
        if dropped_total > 0 {
            log_debug(&format!(
                "level loop lagged the callback thread; dropped {dropped_total} blocks"
            ));
        }
        Ok(())
    }

    /// Find an input configuration for 44.1 kHz and the smallest block the
    /// backend reports as safe for it. A device with no 44.1 kHz support is an
    /// invalid configuration; the session never starts.
    fn capture_config(&self) -> Result<(StreamConfig, SampleFormat, usize)> {
        let rate = SampleRate(SAMPLE_RATE);
        let chosen = self
            .device
            .supported_input_configs()
            .context("failed to query input configurations")?
            .filter(|range| {
                matches!(
                    range.sample_format(),
                    SampleFormat::F32 | SampleFormat::I16 | SampleFormat::U16
                )
            })
            .filter(|range| range.min_sample_rate() <= rate && rate <= range.max_sample_rate())
            .min_by_key(|range| range.channels())
            .ok_or_else(|| anyhow!("device does not support {SAMPLE_RATE} Hz input"))?
            .with_sample_rate(rate);

        let format = chosen.sample_format();
        let (buffer_size, block_samples) = match chosen.buffer_size() {
            SupportedBufferSize::Range { min, .. } => {
                let min = (*min).max(1);
                (BufferSize::Fixed(min), min as usize)
            }
            // Backend will not say; fall back to one poll interval of audio.
            SupportedBufferSize::Unknown => (BufferSize::Default, (SAMPLE_RATE / 5) as usize),
        };
        let config = StreamConfig {
            channels: chosen.channels(),
            sample_rate: rate,
            buffer_size,
        };
        log_debug(&format!(
            "Sampler config: format={format:?} channels={} block_samples={block_samples}",
            config.channels
        ));
        Ok((config, format, block_samples))
    }

    #[cfg(test)]
    pub(super) fn new_for_tests() -> Option<Self> {
        let host = cpal::default_host();
        host.default_input_device().map(|device| Self { device })
    }

    #[cfg(test)]
    pub(super) fn capture_config_for_tests(&self) -> Result<(StreamConfig, SampleFormat, usize)> {
        self.capture_config()
    }
}

impl crate::presenter::LevelSource for Sampler {
    fn run(&self, on_reading: &(dyn Fn(f32) + Sync), is_active: &(dyn Fn() -> bool + Sync)) {
        Sampler::run(self, on_reading, is_active);
    }
}

fn mic_permission_hint() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "macOS: System Settings > Privacy & Security > Microphone (enable your terminal)."
    }
    #[cfg(target_os = "linux")]
    {
        "Linux: check PipeWire/PulseAudio permissions and ensure the device is not muted."
    }
    #[cfg(target_os = "windows")]
    {
        "Windows: Settings > Privacy & Security > Microphone (allow access for your terminal)."
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        "Check OS microphone permissions."
    }
}
