//! The tracker loop driving the timer engine.
//!
//! Once per poll interval (one second by default) the tracker feeds the
//! engine an activity sample, applies any pending control command left by
//! the CLI, and picks up configuration edits. Input events are captured on
//! a dedicated rdev listener thread; the loop itself only compares the
//! shared last-input mark between ticks, so a busy system skips ticks
//! rather than replaying them.

use crate::db::clients::Clients;
use crate::db::snapshot::Snapshots;
use crate::libs::config::{Config, TimerConfig};
use crate::libs::daemon::{self, ControlCommand};
use crate::libs::engine::{ActivitySample, PauseOrigin, TimerEngine, TimerError};
use crate::libs::formatter::format_duration;
use crate::libs::messages::Message;
use crate::{msg_debug, msg_error, msg_info, msg_warning};
use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use parking_lot::Mutex;
use rdev::{listen, Event, EventType};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::oneshot;
use tokio::time::{self, Duration, Instant};

use crate::db::clients::Client;

/// Runs the timer engine against live input samples.
pub struct Tracker {
    engine: TimerEngine<Snapshots>,
    config: TimerConfig,
    poll_interval: Duration,
    last_input: Arc<Mutex<Instant>>, // Moved forward by the listener thread on every input event.
    previous_input: Instant,
    config_mtime: Option<SystemTime>,
}

impl Tracker {
    /// Builds a tracker with the configured timer settings.
    pub fn new() -> Result<Self> {
        let config = Config::read()?;
        let timer = config.timer.unwrap_or_default();
        let store = Snapshots::new()?;
        let engine = TimerEngine::new(store, timer.clone());
        let now = Instant::now();
        let config_mtime = config_modified_at();
        Ok(Self {
            engine,
            poll_interval: Duration::from_millis(timer.poll_interval_ms),
            config: timer,
            last_input: Arc::new(Mutex::new(now)),
            previous_input: now,
            config_mtime,
        })
    }

    /// Opens a session for `client` and runs the tick loop until the
    /// session ends.
    ///
    /// The loop exits on a stop control command or on `shutdown`, which is
    /// signalled by the process signal handlers. Both paths finalize the
    /// session before returning.
    pub async fn run(&mut self, client: &Client, mut shutdown: oneshot::Receiver<()>) -> Result<()> {
        let outcome = self.engine.start(client, Local::now().naive_local())?;
        if let Some(record) = outcome.recovered {
            let name = Clients::new()?
                .fetch_by_id(record.client_id)?
                .map(|c| c.name)
                .unwrap_or_else(|| format!("client #{}", record.client_id));
            msg_info!(Message::RecoveredSession(name, record.end.format("%Y-%m-%d %H:%M").to_string()));
        }

        if client.track_activity {
            self.spawn_listener();
        }
        msg_info!(Message::SessionStarted(client.name.clone()));

        loop {
            tokio::select! {
                _ = time::sleep(self.poll_interval) => {
                    let now = Local::now().naive_local();
                    self.reload_config_if_changed();

                    match daemon::take_control() {
                        Ok(Some(raw)) => match ControlCommand::parse(&raw) {
                            Some(command) => {
                                if self.apply_control(command, now) {
                                    return Ok(());
                                }
                            }
                            None => msg_warning!(Message::ControlCommandInvalid(raw.trim().to_string())),
                        },
                        Ok(None) => {}
                        Err(e) => msg_warning!(Message::TrackerError(e.to_string())),
                    }

                    let sample = ActivitySample { timestamp: now, active: self.input_seen() };
                    let outcome = self.engine.tick(sample);
                    if outcome.auto_paused {
                        msg_info!(Message::SessionAutoPaused(self.config.inactivity_timeout_minutes));
                    }
                }
                _ = &mut shutdown => {
                    let now = Local::now().naive_local();
                    match self.engine.stop(now) {
                        Ok(record) => {
                            msg_info!(Message::SessionStopped(
                                format_duration(record.duration),
                                format_duration(record.idle),
                            ));
                        }
                        // The snapshot survives and recovery picks the
                        // session up on the next start
                        Err(e) => msg_error!(Message::TrackerError(e.to_string())),
                    }
                    return Ok(());
                }
            }
        }
    }

    /// Applies one control command. Returns true when the loop should
    /// exit because the session was stopped.
    fn apply_control(&mut self, command: ControlCommand, now: NaiveDateTime) -> bool {
        match command {
            ControlCommand::Pause => match self.engine.pause(now, PauseOrigin::User) {
                Ok(()) => msg_info!(Message::SessionPaused),
                Err(TimerError::InvalidState { .. }) => msg_warning!(Message::SessionAlreadyPaused),
                Err(e) => msg_error!(Message::TrackerError(e.to_string())),
            },
            ControlCommand::Resume => match self.engine.resume(now) {
                Ok(()) => msg_info!(Message::SessionResumed),
                Err(TimerError::InvalidState { .. }) => msg_warning!(Message::SessionNotPaused),
                Err(e) => msg_error!(Message::TrackerError(e.to_string())),
            },
            ControlCommand::Stop => match self.engine.stop(now) {
                Ok(record) => {
                    msg_info!(Message::SessionStopped(
                        format_duration(record.duration),
                        format_duration(record.idle),
                    ));
                    return true;
                }
                // Keep the session so a repeated stop can retry the commit
                Err(e) => msg_error!(Message::TrackerError(e.to_string())),
            },
        }
        false
    }

    /// Spawns a thread that listens for keyboard, mouse, and scroll events
    /// and moves the shared last-input mark forward. Restarts the listener
    /// on error so monitoring survives transient failures.
    fn spawn_listener(&self) {
        let shared_last_input = self.last_input.clone();
        std::thread::spawn(move || {
            loop {
                let last_input_for_listener = shared_last_input.clone();
                if let Err(e) = listen(move |event: Event| match event.event_type {
                    EventType::KeyPress(_)
                    | EventType::ButtonPress(_)
                    | EventType::MouseMove { .. }
                    | EventType::Wheel { .. } => {
                        *last_input_for_listener.lock() = Instant::now();
                    }
                    _ => {}
                }) {
                    msg_warning!(Message::TrackerError(format!(
                        "Input listener failed: {:?}. Retrying in 1 second...",
                        e
                    )));
                    std::thread::sleep(Duration::from_secs(1));
                } else {
                    // listen only returns on error; treat a clean return as final
                    break;
                }
            }
        });
    }

    /// Whether any input arrived since the previous tick.
    fn input_seen(&mut self) -> bool {
        let mark = *self.last_input.lock();
        let seen = mark > self.previous_input;
        self.previous_input = mark;
        seen
    }

    /// Picks up configuration edits between ticks, keyed off the config
    /// file's modification time.
    fn reload_config_if_changed(&mut self) {
        let mtime = config_modified_at();
        if mtime == self.config_mtime {
            return;
        }
        self.config_mtime = mtime;
        match Config::read() {
            Ok(config) => {
                let timer = config.timer.unwrap_or_default();
                if timer != self.config {
                    self.poll_interval = Duration::from_millis(timer.poll_interval_ms);
                    self.engine.update_config(timer.clone());
                    self.config = timer;
                    msg_debug!("Timer configuration reloaded");
                }
            }
            Err(e) => msg_warning!(Message::ConfigReloadFailed(e.to_string())),
        }
    }
}

fn config_modified_at() -> Option<SystemTime> {
    let path = Config::file_path().ok()?;
    std::fs::metadata(path).and_then(|meta| meta.modified()).ok()
}
