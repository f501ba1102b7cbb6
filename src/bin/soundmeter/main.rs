//! SoundMeter entrypoint: a terminal sound-level meter.
//!
//! Samples the default microphone on a fixed cadence and renders the latest
//! decibel estimate as a color-banded bar with a danger indicator. The
//! sampling loop runs on a background worker; the UI polls shared state.
//!
//! Keys: `s` starts a session, `t` stops it, `q`/Esc quits.

mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use soundmeter::audio::Sampler;
use soundmeter::config::AppConfig;
use soundmeter::presenter::LevelPresenter;
use soundmeter::terminal_restore::TerminalRestoreGuard;
use soundmeter::{init_logging, init_tracing, log_debug, log_file_path};
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// How long the event loop waits for a key before redrawing.
const INPUT_POLL: Duration = Duration::from_millis(50);

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;

    if config.list_input_devices {
        list_input_devices()?;
        return Ok(());
    }

    init_logging(&config);
    init_tracing(&config);
    log_debug("=== SoundMeter started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));

    let guard = TerminalRestoreGuard::new();
    guard.enable_raw_mode()?;
    let mut stdout = io::stdout();
    guard.enter_alt_screen(&mut stdout)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut presenter = LevelPresenter::new();
    let mut sampler: Option<Arc<Sampler>> = None;
    let mut status = String::from("Idle. Press 's' to check the sound level.");

    loop {
        presenter.poll_job();
        terminal.draw(|frame| ui::draw(frame, &presenter, &status))?;

        if !event::poll(INPUT_POLL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Char('s') => {
                if let Some(source) = acquire_sampler(&mut sampler, &config, &mut status) {
                    if presenter.start(source) {
                        status = "Recording. Press 't' to stop.".into();
                    }
                }
            }
            KeyCode::Char('t') => {
                if presenter.stop() {
                    status = "Stopped. Press 's' to start again.".into();
                }
            }
            _ => {}
        }
    }

    // Wait for the worker to release the stream before leaving the alt screen.
    presenter.shutdown();
    guard.restore();
    Ok(())
}

/// Create the sampler on first use so we only query the OS once. Failure is
/// reported in the status line; no session starts.
fn acquire_sampler(
    sampler: &mut Option<Arc<Sampler>>,
    config: &AppConfig,
    status: &mut String,
) -> Option<Arc<Sampler>> {
    if let Some(existing) = sampler {
        return Some(existing.clone());
    }
    match Sampler::new(config.input_device.as_deref()) {
        Ok(created) => {
            let created = Arc::new(created);
            log_debug(&format!("Using input device: {}", created.device_name()));
            *sampler = Some(created.clone());
            Some(created)
        }
        Err(err) => {
            log_debug(&format!("audio input unavailable: {err:#}"));
            *status = "Audio input unavailable; see the debug log.".into();
            None
        }
    }
}

fn list_input_devices() -> Result<()> {
    let devices = Sampler::list_devices()?;
    if devices.is_empty() {
        println!("No audio input devices detected.");
        return Ok(());
    }
    for name in devices {
        println!("{name}");
    }
    Ok(())
}
