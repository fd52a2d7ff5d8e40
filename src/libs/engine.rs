//! Session timer state machine with idle detection and crash recovery.
//!
//! The engine owns the single in-progress work session. It moves between
//! three phases:
//!
//! - **Idle**: no session open
//! - **Running**: accruing billable (active) time
//! - **Paused**: accruing idle time, either by user request or because the
//!   inactivity timeout elapsed
//!
//! User commands (`start`, `pause`, `resume`, `stop`) and the periodic
//! `tick` feed the same state machine. Callers hold the engine behind one
//! lock, so every call is a single atomic transition; `tick` and a user
//! command never interleave partially.
//!
//! ## Crash Safety
//!
//! While a session is open the engine rewrites a single snapshot record on
//! every autosave interval (30 seconds by default). A crash therefore loses
//! at most one interval of unrecorded time. On the next process start,
//! before any new session is accepted, [`TimerEngine::recover`] finalizes
//! the snapshot into a committed time entry ending at the snapshot's save
//! time. The session is presumed lost, not continued. Recovery runs at most
//! once per process.
//!
//! A failed snapshot write is logged and retried on the next tick; it never
//! aborts the session. A failed final commit in [`TimerEngine::stop`] aborts
//! the stop and keeps the session in memory so the user can retry.
//!
//! ## Storage Boundary
//!
//! All persistence goes through the [`SessionStore`] trait. Production code
//! uses the SQLite-backed store; tests substitute an in-memory store to
//! drive the state machine through failure scenarios.

use crate::db::clients::Client;
use crate::libs::config::TimerConfig;
use crate::libs::messages::Message;
use crate::{msg_debug, msg_warning};
use anyhow::Result;
use chrono::NaiveDateTime;
use std::fmt;
use thiserror::Error;

/// Phase of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
}

impl TimerPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Running => "running",
            TimerPhase::Paused => "paused",
        }
    }
}

impl fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who initiated a pause.
///
/// User pauses and inactivity pauses accrue identically; the origin is kept
/// so collaborators can report the difference, and so `resume` semantics
/// stay uniform across both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseOrigin {
    User,
    Inactivity,
}

/// One activity sample from the monitor loop.
///
/// `active` reports whether any keyboard or pointer input was seen since
/// the previous sample.
#[derive(Debug, Clone, Copy)]
pub struct ActivitySample {
    pub timestamp: NaiveDateTime,
    pub active: bool,
}

/// The in-place crash-recovery record of the current session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub client_id: i64,
    pub start: NaiveDateTime,
    /// Billable seconds accrued so far.
    pub duration: i64,
    /// Idle seconds accrued so far.
    pub idle: i64,
    pub phase: TimerPhase,
    pub saved_at: NaiveDateTime,
}

/// A finalized session ready to be committed as a time entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub client_id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Billable seconds.
    pub duration: i64,
    /// Idle seconds, excluded from billing.
    pub idle: i64,
}

/// Result of a [`TimerEngine::start`] call.
#[derive(Debug, Default)]
pub struct StartOutcome {
    /// An interrupted session that was finalized before this one began.
    pub recovered: Option<SessionRecord>,
}

/// Result of a single [`TimerEngine::tick`].
#[derive(Debug, Default)]
pub struct TickOutcome {
    /// The inactivity timeout elapsed and the engine paused the session.
    pub auto_paused: bool,
}

/// Errors surfaced by timer operations.
#[derive(Debug, Error)]
pub enum TimerError {
    /// The requested transition is illegal for the current phase.
    #[error("cannot {operation} while the timer is {phase}")]
    InvalidState { operation: &'static str, phase: TimerPhase },

    /// A required read or write to the session store failed.
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

/// Durable storage consumed by the timer engine.
///
/// The engine defines the shape and timing of writes; implementations own
/// durability. `finalize_session` must commit the entry and remove the
/// snapshot as one unit, and must be idempotent for the same
/// (client, start) identity so a retried finalization cannot duplicate an
/// entry.
pub trait SessionStore {
    /// Overwrites the snapshot record in place.
    fn save_snapshot(&mut self, snapshot: &SessionSnapshot) -> Result<()>;

    /// Loads the snapshot, or `None` if no session was interrupted.
    fn load_snapshot(&mut self) -> Result<Option<SessionSnapshot>>;

    /// Removes the snapshot without committing anything.
    fn discard_snapshot(&mut self) -> Result<()>;

    /// Commits a finalized entry and clears the snapshot atomically.
    fn finalize_session(&mut self, record: &SessionRecord) -> Result<()>;
}

/// The in-progress session owned by the engine.
#[derive(Debug, Clone)]
pub struct Session {
    pub client_id: i64,
    pub client_name: String,
    /// Capability captured at session start; when false, ticks never
    /// auto-pause and all elapsed time counts as active.
    pub track_activity: bool,
    pub start: NaiveDateTime,
    /// Billable seconds accrued so far.
    pub duration: i64,
    /// Idle seconds accrued so far.
    pub idle: i64,
    /// Running or Paused; Idle is represented by the absence of a session.
    pub phase: TimerPhase,
    pub pause_origin: Option<PauseOrigin>,
    /// Point in time up to which duration and idle are accounted.
    accrual_mark: NaiveDateTime,
    last_activity: NaiveDateTime,
    /// `None` means a snapshot write is due on the next tick.
    last_autosave: Option<NaiveDateTime>,
}

impl Session {
    /// Accounts elapsed time up to `t` against the current phase.
    fn accrue_to(&mut self, t: NaiveDateTime) {
        let seconds = (t - self.accrual_mark).num_seconds();
        if seconds <= 0 {
            return;
        }
        match self.phase {
            TimerPhase::Running => self.duration += seconds,
            _ => self.idle += seconds,
        }
        self.accrual_mark = t;
    }

    /// Projects the finalized record at `end` without mutating the session.
    fn record_at(&self, end: NaiveDateTime) -> SessionRecord {
        let mut duration = self.duration;
        let mut idle = self.idle;
        let pending = (end - self.accrual_mark).num_seconds().max(0);
        match self.phase {
            TimerPhase::Running => duration += pending,
            _ => idle += pending,
        }
        SessionRecord {
            client_id: self.client_id,
            start: self.start,
            end,
            duration,
            idle,
        }
    }

    fn snapshot_at(&self, saved_at: NaiveDateTime) -> SessionSnapshot {
        SessionSnapshot {
            client_id: self.client_id,
            start: self.start,
            duration: self.duration,
            idle: self.idle,
            phase: self.phase,
            saved_at,
        }
    }
}

/// The session timer state machine.
///
/// Constructed once at process start and shared behind a single lock. All
/// timestamps come from the caller, which keeps transitions deterministic
/// and testable.
pub struct TimerEngine<S> {
    store: S,
    config: TimerConfig,
    session: Option<Session>,
    recovery_checked: bool,
}

impl<S: SessionStore> TimerEngine<S> {
    pub fn new(store: S, config: TimerConfig) -> Self {
        Self {
            store,
            config,
            session: None,
            recovery_checked: false,
        }
    }

    /// Current phase; `Idle` whenever no session is open.
    pub fn phase(&self) -> TimerPhase {
        self.session.as_ref().map_or(TimerPhase::Idle, |s| s.phase)
    }

    /// The open session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Replaces the timer configuration.
    ///
    /// Takes effect on the next tick; the current session keeps running.
    pub fn update_config(&mut self, config: TimerConfig) {
        self.config = config;
    }

    /// Finalizes an interrupted session left behind by a crashed process.
    ///
    /// The snapshot becomes a committed entry ending at its save time.
    /// Returns the recovered record, or `None` when there was nothing to
    /// recover or recovery already ran in this process. A persistence
    /// failure leaves the snapshot in place and allows a retry; the
    /// store's idempotent finalization makes the retry safe.
    pub fn recover(&mut self) -> Result<Option<SessionRecord>, TimerError> {
        if self.recovery_checked {
            return Ok(None);
        }
        let snapshot = match self.store.load_snapshot()? {
            Some(snapshot) => snapshot,
            None => {
                self.recovery_checked = true;
                return Ok(None);
            }
        };

        let record = SessionRecord {
            client_id: snapshot.client_id,
            start: snapshot.start,
            end: snapshot.saved_at,
            duration: snapshot.duration,
            idle: snapshot.idle,
        };
        self.store.finalize_session(&record)?;
        self.recovery_checked = true;
        Ok(Some(record))
    }

    /// Drops an interrupted session without committing it.
    ///
    /// Returns `true` when a snapshot existed and was discarded.
    pub fn discard_recovery(&mut self) -> Result<bool, TimerError> {
        if self.store.load_snapshot()?.is_none() {
            self.recovery_checked = true;
            return Ok(false);
        }
        self.store.discard_snapshot()?;
        self.recovery_checked = true;
        Ok(true)
    }

    /// Opens a session for `client` and begins accruing active time.
    ///
    /// Recovery of any interrupted session happens first, before the new
    /// session is accepted; the finalized record is surfaced in the
    /// outcome. Fails with `InvalidState` while any session is open.
    pub fn start(&mut self, client: &Client, now: NaiveDateTime) -> Result<StartOutcome, TimerError> {
        if self.session.is_some() {
            return Err(TimerError::InvalidState {
                operation: "start",
                phase: self.phase(),
            });
        }

        let recovered = self.recover()?;

        let mut session = Session {
            client_id: client.id,
            client_name: client.name.clone(),
            track_activity: client.track_activity,
            start: now,
            duration: 0,
            idle: 0,
            phase: TimerPhase::Running,
            pause_origin: None,
            accrual_mark: now,
            last_activity: now,
            last_autosave: None,
        };

        // First snapshot immediately; a crash before the first autosave
        // interval must still be recoverable
        let snapshot = session.snapshot_at(now);
        match self.store.save_snapshot(&snapshot) {
            Ok(()) => session.last_autosave = Some(now),
            Err(e) => msg_warning!(Message::SnapshotWriteFailed(e.to_string())),
        }

        self.session = Some(session);
        Ok(StartOutcome { recovered })
    }

    /// Stops billable accrual and starts idle accrual.
    ///
    /// Valid only while `Running`.
    pub fn pause(&mut self, now: NaiveDateTime, origin: PauseOrigin) -> Result<(), TimerError> {
        let phase = self.phase();
        let session = match self.session.as_mut() {
            Some(session) if session.phase == TimerPhase::Running => session,
            _ => return Err(TimerError::InvalidState { operation: "pause", phase }),
        };
        session.accrue_to(now);
        session.phase = TimerPhase::Paused;
        session.pause_origin = Some(origin);
        Ok(())
    }

    /// Resumes billable accrual after a pause.
    ///
    /// Valid only while `Paused`, regardless of whether the pause was
    /// user- or engine-initiated. The inactivity window restarts from the
    /// resume time.
    pub fn resume(&mut self, now: NaiveDateTime) -> Result<(), TimerError> {
        let phase = self.phase();
        let session = match self.session.as_mut() {
            Some(session) if session.phase == TimerPhase::Paused => session,
            _ => return Err(TimerError::InvalidState { operation: "resume", phase }),
        };
        session.accrue_to(now);
        session.phase = TimerPhase::Running;
        session.pause_origin = None;
        session.last_activity = now;
        Ok(())
    }

    /// Finalizes the session, commits the entry, and returns to `Idle`.
    ///
    /// The commit and the snapshot removal are one atomic store operation,
    /// so the snapshot can never outlive a clean stop. If the commit
    /// fails, the session is left untouched in memory and the call can be
    /// retried.
    pub fn stop(&mut self, now: NaiveDateTime) -> Result<SessionRecord, TimerError> {
        let phase = self.phase();
        let record = match self.session.as_ref() {
            Some(session) => session.record_at(now),
            None => return Err(TimerError::InvalidState { operation: "stop", phase }),
        };

        self.store.finalize_session(&record)?;
        self.session = None;
        Ok(record)
    }

    /// Advances timers from one monitor sample.
    ///
    /// Accrues elapsed time against the current phase, pauses the session
    /// once the inactivity timeout elapses (for activity-tracked clients),
    /// and writes the autosave snapshot on its interval in both Running
    /// and Paused. A no-op while `Idle`.
    ///
    /// Duplicate sample timestamps are ignored; out-of-order samples are
    /// rejected and logged. Skipped samples are tolerated, the next sample
    /// simply covers a longer span.
    pub fn tick(&mut self, sample: ActivitySample) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        let timeout_seconds = (self.config.inactivity_timeout_minutes * 60) as i64;
        let autosave_seconds = self.config.autosave_interval_seconds as i64;

        let session = match self.session.as_mut() {
            Some(session) => session,
            None => return outcome,
        };

        if sample.timestamp < session.accrual_mark {
            msg_debug!(format!(
                "Rejected out-of-order sample at {} (accounted up to {})",
                sample.timestamp, session.accrual_mark
            ));
            return outcome;
        }
        if sample.timestamp == session.accrual_mark {
            // Duplicate sample, already accounted
            return outcome;
        }

        session.accrue_to(sample.timestamp);
        if sample.active {
            session.last_activity = sample.timestamp;
        }

        // Engine-initiated pause once the inactivity window elapses. The
        // window itself was just accrued as active: the user is presumed
        // working until the timeout proves otherwise.
        if session.phase == TimerPhase::Running
            && session.track_activity
            && (sample.timestamp - session.last_activity).num_seconds() >= timeout_seconds
        {
            session.phase = TimerPhase::Paused;
            session.pause_origin = Some(PauseOrigin::Inactivity);
            outcome.auto_paused = true;
        }

        // Autosave in both Running and Paused; a failure keeps the stale
        // snapshot and retries on the next tick
        let due = match session.last_autosave {
            Some(t) => (sample.timestamp - t).num_seconds() >= autosave_seconds,
            None => true,
        };
        if due {
            let snapshot = session.snapshot_at(sample.timestamp);
            match self.store.save_snapshot(&snapshot) {
                Ok(()) => session.last_autosave = Some(sample.timestamp),
                Err(e) => {
                    msg_warning!(Message::SnapshotWriteFailed(e.to_string()));
                    session.last_autosave = None;
                }
            }
        }

        outcome
    }
}
