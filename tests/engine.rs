#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Result};
    use billable::db::clients::Client;
    use billable::libs::config::TimerConfig;
    use billable::libs::engine::{ActivitySample, PauseOrigin, SessionRecord, SessionSnapshot, SessionStore, TimerEngine, TimerError, TimerPhase};
    use billable::libs::money::Money;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// In-memory store with switchable failure modes.
    #[derive(Default)]
    struct StoreState {
        snapshot: Option<SessionSnapshot>,
        entries: Vec<SessionRecord>,
        fail_saves: bool,
        fail_finalize: bool,
        save_count: usize,
        finalize_count: usize,
    }

    #[derive(Clone, Default)]
    struct MemoryStore(Rc<RefCell<StoreState>>);

    impl MemoryStore {
        fn state(&self) -> std::cell::Ref<'_, StoreState> {
            self.0.borrow()
        }

        fn set_fail_saves(&self, fail: bool) {
            self.0.borrow_mut().fail_saves = fail;
        }

        fn set_fail_finalize(&self, fail: bool) {
            self.0.borrow_mut().fail_finalize = fail;
        }

        fn seed_snapshot(&self, snapshot: SessionSnapshot) {
            self.0.borrow_mut().snapshot = Some(snapshot);
        }
    }

    impl SessionStore for MemoryStore {
        fn save_snapshot(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
            let mut state = self.0.borrow_mut();
            state.save_count += 1;
            if state.fail_saves {
                return Err(anyhow!("disk full"));
            }
            state.snapshot = Some(snapshot.clone());
            Ok(())
        }

        fn load_snapshot(&mut self) -> Result<Option<SessionSnapshot>> {
            Ok(self.0.borrow().snapshot.clone())
        }

        fn discard_snapshot(&mut self) -> Result<()> {
            self.0.borrow_mut().snapshot = None;
            Ok(())
        }

        fn finalize_session(&mut self, record: &SessionRecord) -> Result<()> {
            let mut state = self.0.borrow_mut();
            state.finalize_count += 1;
            if state.fail_finalize {
                return Err(anyhow!("database locked"));
            }
            // Same identity as the UNIQUE(client_id, start) constraint
            if !state.entries.iter().any(|e| e.client_id == record.client_id && e.start == record.start) {
                state.entries.push(record.clone());
            }
            state.snapshot = None;
            Ok(())
        }
    }

    fn test_client(id: i64, track_activity: bool) -> Client {
        Client {
            id,
            name: format!("client-{}", id),
            rate: Money::from_cents(50_00),
            track_activity,
            favorite: false,
            archived: false,
            created_at: at(2025, 3, 1, 8, 0, 0),
        }
    }

    fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day).unwrap().and_hms_opt(hour, min, sec).unwrap()
    }

    fn config() -> TimerConfig {
        TimerConfig {
            inactivity_timeout_minutes: 10,
            autosave_interval_seconds: 30,
            poll_interval_ms: 1000,
        }
    }

    fn active(t: NaiveDateTime) -> ActivitySample {
        ActivitySample { timestamp: t, active: true }
    }

    fn inactive(t: NaiveDateTime) -> ActivitySample {
        ActivitySample { timestamp: t, active: false }
    }

    fn new_engine() -> (TimerEngine<MemoryStore>, MemoryStore) {
        let store = MemoryStore::default();
        (TimerEngine::new(store.clone(), config()), store)
    }

    #[test]
    fn test_start_opens_running_session_with_initial_snapshot() {
        let (mut engine, store) = new_engine();
        let t0 = at(2025, 3, 3, 9, 0, 0);

        let outcome = engine.start(&test_client(1, true), t0).unwrap();

        assert!(outcome.recovered.is_none());
        assert_eq!(engine.phase(), TimerPhase::Running);
        let snapshot = store.state().snapshot.clone().unwrap();
        assert_eq!(snapshot.client_id, 1);
        assert_eq!(snapshot.start, t0);
        assert_eq!(snapshot.duration, 0);
        assert_eq!(snapshot.phase, TimerPhase::Running);
    }

    #[test]
    fn test_double_start_rejected() {
        let (mut engine, _store) = new_engine();
        let t0 = at(2025, 3, 3, 9, 0, 0);
        engine.start(&test_client(1, true), t0).unwrap();

        let err = engine.start(&test_client(2, true), t0 + Duration::seconds(5)).unwrap_err();
        assert!(matches!(err, TimerError::InvalidState { operation: "start", .. }));
        // The original session is untouched
        assert_eq!(engine.session().unwrap().client_id, 1);
    }

    #[test]
    fn test_accrual_follows_phase() {
        let (mut engine, _store) = new_engine();
        let t0 = at(2025, 3, 3, 9, 0, 0);
        engine.start(&test_client(1, true), t0).unwrap();

        // 60s running
        engine.tick(active(t0 + Duration::seconds(60)));
        engine.pause(t0 + Duration::seconds(90), PauseOrigin::User).unwrap();
        // 90..150 paused
        engine.tick(active(t0 + Duration::seconds(150)));
        engine.resume(t0 + Duration::seconds(150)).unwrap();
        // 150..210 running again
        engine.tick(active(t0 + Duration::seconds(210)));

        let session = engine.session().unwrap();
        // 60 ticked + 30 accrued by pause + 60 after resume
        assert_eq!(session.duration, 150);
        assert_eq!(session.idle, 60);
    }

    #[test]
    fn test_pause_requires_running_and_resume_requires_paused() {
        let (mut engine, _store) = new_engine();
        let t0 = at(2025, 3, 3, 9, 0, 0);

        assert!(matches!(
            engine.pause(t0, PauseOrigin::User),
            Err(TimerError::InvalidState { operation: "pause", phase: TimerPhase::Idle })
        ));

        engine.start(&test_client(1, true), t0).unwrap();
        assert!(matches!(
            engine.resume(t0 + Duration::seconds(1)),
            Err(TimerError::InvalidState { operation: "resume", phase: TimerPhase::Running })
        ));

        engine.pause(t0 + Duration::seconds(2), PauseOrigin::User).unwrap();
        assert!(matches!(
            engine.pause(t0 + Duration::seconds(3), PauseOrigin::User),
            Err(TimerError::InvalidState { operation: "pause", phase: TimerPhase::Paused })
        ));
    }

    #[test]
    fn test_duplicate_sample_is_ignored() {
        let (mut engine, _store) = new_engine();
        let t0 = at(2025, 3, 3, 9, 0, 0);
        engine.start(&test_client(1, true), t0).unwrap();

        let t1 = t0 + Duration::seconds(30);
        engine.tick(active(t1));
        let before = engine.session().unwrap().duration;
        engine.tick(active(t1));
        engine.tick(active(t1));

        assert_eq!(engine.session().unwrap().duration, before);
    }

    #[test]
    fn test_out_of_order_sample_is_rejected() {
        let (mut engine, _store) = new_engine();
        let t0 = at(2025, 3, 3, 9, 0, 0);
        engine.start(&test_client(1, true), t0).unwrap();

        engine.tick(active(t0 + Duration::seconds(60)));
        let outcome = engine.tick(active(t0 + Duration::seconds(30)));

        assert!(!outcome.auto_paused);
        let session = engine.session().unwrap();
        assert_eq!(session.duration, 60);
        assert_eq!(session.idle, 0);
    }

    #[test]
    fn test_missed_samples_are_covered_by_the_next_one() {
        let (mut engine, _store) = new_engine();
        let t0 = at(2025, 3, 3, 9, 0, 0);
        engine.start(&test_client(1, true), t0).unwrap();

        // Five minutes with no samples at all, then one arrives
        engine.tick(active(t0 + Duration::seconds(300)));

        assert_eq!(engine.session().unwrap().duration, 300);
    }

    #[test]
    fn test_auto_pause_after_inactivity_timeout() {
        let (mut engine, _store) = new_engine();
        let t0 = at(2025, 3, 3, 9, 0, 0);
        engine.start(&test_client(1, true), t0).unwrap();

        // Activity at +60, then silence up to the 10 minute timeout
        engine.tick(active(t0 + Duration::seconds(60)));
        let outcome = engine.tick(inactive(t0 + Duration::seconds(60 + 599)));
        assert!(!outcome.auto_paused);
        assert_eq!(engine.phase(), TimerPhase::Running);

        let outcome = engine.tick(inactive(t0 + Duration::seconds(60 + 600)));
        assert!(outcome.auto_paused);
        assert_eq!(engine.phase(), TimerPhase::Paused);
        let session = engine.session().unwrap();
        assert_eq!(session.pause_origin, Some(PauseOrigin::Inactivity));
        // The timed-out window itself was accrued as active
        assert_eq!(session.duration, 660);
        assert_eq!(session.idle, 0);
    }

    #[test]
    fn test_no_auto_resume_on_new_activity() {
        let (mut engine, _store) = new_engine();
        let t0 = at(2025, 3, 3, 9, 0, 0);
        engine.start(&test_client(1, true), t0).unwrap();
        engine.tick(inactive(t0 + Duration::seconds(600)));
        assert_eq!(engine.phase(), TimerPhase::Paused);

        // Fresh input arrives; the pause must hold until an explicit resume
        engine.tick(active(t0 + Duration::seconds(700)));
        assert_eq!(engine.phase(), TimerPhase::Paused);
        assert_eq!(engine.session().unwrap().idle, 100);

        engine.resume(t0 + Duration::seconds(720)).unwrap();
        assert_eq!(engine.phase(), TimerPhase::Running);
    }

    #[test]
    fn test_untracked_client_never_auto_pauses() {
        let (mut engine, _store) = new_engine();
        let t0 = at(2025, 3, 3, 9, 0, 0);
        engine.start(&test_client(1, false), t0).unwrap();

        // An hour of silence
        engine.tick(inactive(t0 + Duration::seconds(3600)));

        assert_eq!(engine.phase(), TimerPhase::Running);
        assert_eq!(engine.session().unwrap().duration, 3600);
    }

    #[test]
    fn test_autosave_on_interval_in_both_phases() {
        let (mut engine, store) = new_engine();
        let t0 = at(2025, 3, 3, 9, 0, 0);
        engine.start(&test_client(1, true), t0).unwrap();
        assert_eq!(store.state().save_count, 1); // initial snapshot

        // Within the interval, no write
        engine.tick(active(t0 + Duration::seconds(10)));
        assert_eq!(store.state().save_count, 1);

        // Interval elapsed
        engine.tick(active(t0 + Duration::seconds(30)));
        assert_eq!(store.state().save_count, 2);
        assert_eq!(store.state().snapshot.as_ref().unwrap().duration, 30);

        // Paused sessions keep snapshotting
        engine.pause(t0 + Duration::seconds(40), PauseOrigin::User).unwrap();
        engine.tick(inactive(t0 + Duration::seconds(60)));
        assert_eq!(store.state().save_count, 3);
        assert_eq!(store.state().snapshot.as_ref().unwrap().phase, TimerPhase::Paused);
    }

    #[test]
    fn test_autosave_failure_retries_on_next_tick() {
        let (mut engine, store) = new_engine();
        let t0 = at(2025, 3, 3, 9, 0, 0);
        engine.start(&test_client(1, true), t0).unwrap();

        store.set_fail_saves(true);
        engine.tick(active(t0 + Duration::seconds(30)));
        assert_eq!(store.state().snapshot.as_ref().unwrap().duration, 0); // stale initial snapshot

        // Failure marks the autosave as due immediately, not one interval later
        store.set_fail_saves(false);
        engine.tick(active(t0 + Duration::seconds(31)));
        assert_eq!(store.state().snapshot.as_ref().unwrap().duration, 31);
    }

    #[test]
    fn test_stop_commits_entry_and_clears_snapshot() {
        let (mut engine, store) = new_engine();
        let t0 = at(2025, 3, 3, 9, 0, 0);
        engine.start(&test_client(1, true), t0).unwrap();
        engine.tick(active(t0 + Duration::seconds(120)));

        let record = engine.stop(t0 + Duration::seconds(200)).unwrap();

        assert_eq!(record.duration, 200);
        assert_eq!(record.idle, 0);
        assert_eq!(record.end, t0 + Duration::seconds(200));
        assert_eq!(engine.phase(), TimerPhase::Idle);
        let state = store.state();
        assert_eq!(state.entries.len(), 1);
        assert!(state.snapshot.is_none());
    }

    #[test]
    fn test_stop_failure_retains_session_for_retry() {
        let (mut engine, store) = new_engine();
        let t0 = at(2025, 3, 3, 9, 0, 0);
        engine.start(&test_client(1, true), t0).unwrap();
        engine.tick(active(t0 + Duration::seconds(60)));

        store.set_fail_finalize(true);
        let err = engine.stop(t0 + Duration::seconds(90)).unwrap_err();
        assert!(matches!(err, TimerError::Persistence(_)));

        // Still running, nothing lost; accrual continues past the failed stop
        assert_eq!(engine.phase(), TimerPhase::Running);
        engine.tick(active(t0 + Duration::seconds(120)));

        store.set_fail_finalize(false);
        let record = engine.stop(t0 + Duration::seconds(150)).unwrap();
        assert_eq!(record.duration, 150);
        assert_eq!(store.state().entries.len(), 1);
        assert_eq!(engine.phase(), TimerPhase::Idle);
    }

    #[test]
    fn test_recovery_finalizes_at_snapshot_time() {
        let (mut engine, store) = new_engine();
        let start = at(2025, 3, 3, 9, 0, 0);
        let saved_at = at(2025, 3, 3, 9, 45, 0);
        store.seed_snapshot(SessionSnapshot {
            client_id: 7,
            start,
            duration: 2400,
            idle: 300,
            phase: TimerPhase::Running,
            saved_at,
        });

        let record = engine.recover().unwrap().unwrap();

        // The entry ends at the last snapshot, never at the recovery time
        assert_eq!(record.end, saved_at);
        assert_eq!(record.duration, 2400);
        assert_eq!(record.idle, 300);
        let state = store.state();
        assert_eq!(state.entries.len(), 1);
        assert!(state.snapshot.is_none());
    }

    #[test]
    fn test_recovery_runs_once_per_process() {
        let (mut engine, store) = new_engine();
        store.seed_snapshot(SessionSnapshot {
            client_id: 7,
            start: at(2025, 3, 3, 9, 0, 0),
            duration: 100,
            idle: 0,
            phase: TimerPhase::Paused,
            saved_at: at(2025, 3, 3, 9, 2, 0),
        });

        assert!(engine.recover().unwrap().is_some());
        assert!(engine.recover().unwrap().is_none());
        assert_eq!(store.state().finalize_count, 1);
    }

    #[test]
    fn test_recovery_with_no_snapshot_is_a_noop() {
        let (mut engine, store) = new_engine();
        assert!(engine.recover().unwrap().is_none());
        assert_eq!(store.state().finalize_count, 0);
    }

    #[test]
    fn test_recovery_failure_allows_retry() {
        let (mut engine, store) = new_engine();
        store.seed_snapshot(SessionSnapshot {
            client_id: 7,
            start: at(2025, 3, 3, 9, 0, 0),
            duration: 100,
            idle: 0,
            phase: TimerPhase::Running,
            saved_at: at(2025, 3, 3, 9, 2, 0),
        });

        store.set_fail_finalize(true);
        assert!(engine.recover().is_err());

        // The failed attempt must not consume the once-per-process check
        store.set_fail_finalize(false);
        assert!(engine.recover().unwrap().is_some());
        assert_eq!(store.state().entries.len(), 1);
    }

    #[test]
    fn test_start_recovers_interrupted_session_first() {
        let (mut engine, store) = new_engine();
        let saved_at = at(2025, 3, 2, 17, 30, 0);
        store.seed_snapshot(SessionSnapshot {
            client_id: 3,
            start: at(2025, 3, 2, 16, 0, 0),
            duration: 5000,
            idle: 400,
            phase: TimerPhase::Running,
            saved_at,
        });

        let t0 = at(2025, 3, 3, 9, 0, 0);
        let outcome = engine.start(&test_client(1, true), t0).unwrap();

        let recovered = outcome.recovered.unwrap();
        assert_eq!(recovered.client_id, 3);
        assert_eq!(recovered.end, saved_at);
        // The new session owns the snapshot slot now
        let state = store.state();
        assert_eq!(state.snapshot.as_ref().unwrap().client_id, 1);
        assert_eq!(state.entries.len(), 1);
    }

    #[test]
    fn test_discard_recovery_drops_snapshot_without_entry() {
        let (mut engine, store) = new_engine();
        store.seed_snapshot(SessionSnapshot {
            client_id: 7,
            start: at(2025, 3, 3, 9, 0, 0),
            duration: 100,
            idle: 0,
            phase: TimerPhase::Running,
            saved_at: at(2025, 3, 3, 9, 2, 0),
        });

        assert!(engine.discard_recovery().unwrap());
        let state = store.state();
        assert!(state.snapshot.is_none());
        assert!(state.entries.is_empty());
        drop(state);

        let (mut fresh, _store) = new_engine();
        assert!(!fresh.discard_recovery().unwrap());
    }

    #[test]
    fn test_config_update_applies_to_next_tick() {
        let (mut engine, _store) = new_engine();
        let t0 = at(2025, 3, 3, 9, 0, 0);
        engine.start(&test_client(1, true), t0).unwrap();

        engine.update_config(TimerConfig {
            inactivity_timeout_minutes: 1,
            autosave_interval_seconds: 30,
            poll_interval_ms: 1000,
        });

        let outcome = engine.tick(inactive(t0 + Duration::seconds(60)));
        assert!(outcome.auto_paused);
    }
}
