#[cfg(test)]
mod tests {
    use billable::db::clients::Clients;
    use billable::db::entries::{Entries, EntryFilter};
    use billable::db::snapshot::Snapshots;
    use billable::libs::engine::{SessionRecord, SessionSnapshot, TimerPhase};
    use billable::libs::money::Money;
    use chrono::{NaiveDate, NaiveDateTime};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct SnapshotTestContext {
        _temp_dir: TempDir,
    }

    impl TestContext for SnapshotTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            std::env::set_var("HOME", temp_dir.path());
            std::env::set_var("LOCALAPPDATA", temp_dir.path());
            SnapshotTestContext { _temp_dir: temp_dir }
        }
    }

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 7, 1).unwrap().and_hms_opt(hour, min, 0).unwrap()
    }

    fn snapshot(client_id: i64, duration: i64, phase: TimerPhase) -> SessionSnapshot {
        SessionSnapshot {
            client_id,
            start: at(9, 0),
            duration,
            idle: 45,
            phase,
            saved_at: at(9, 30),
        }
    }

    #[test_context(SnapshotTestContext)]
    #[test]
    fn test_save_and_fetch_round_trip(_ctx: &mut SnapshotTestContext) {
        let clients = Clients::new().unwrap();
        let id = clients.create("globex", Money::from_cents(50_00), true).unwrap();

        let snapshots = Snapshots::new().unwrap();
        assert!(snapshots.fetch().unwrap().is_none());

        let saved = snapshot(id, 1500, TimerPhase::Paused);
        snapshots.save(&saved).unwrap();

        let loaded = snapshots.fetch().unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.phase, TimerPhase::Paused);
    }

    #[test_context(SnapshotTestContext)]
    #[test]
    fn test_save_overwrites_the_single_row(_ctx: &mut SnapshotTestContext) {
        let clients = Clients::new().unwrap();
        let id = clients.create("globex", Money::from_cents(50_00), true).unwrap();

        let snapshots = Snapshots::new().unwrap();
        snapshots.save(&snapshot(id, 100, TimerPhase::Running)).unwrap();
        snapshots.save(&snapshot(id, 200, TimerPhase::Running)).unwrap();
        snapshots.save(&snapshot(id, 300, TimerPhase::Running)).unwrap();

        let count: i64 = snapshots.conn.query_row("SELECT COUNT(*) FROM session_snapshot", [], |row| row.get(0)).unwrap();
        assert_eq!(count, 1);
        assert_eq!(snapshots.fetch().unwrap().unwrap().duration, 300);
    }

    #[test_context(SnapshotTestContext)]
    #[test]
    fn test_clear_removes_snapshot(_ctx: &mut SnapshotTestContext) {
        let clients = Clients::new().unwrap();
        let id = clients.create("globex", Money::from_cents(50_00), true).unwrap();

        let snapshots = Snapshots::new().unwrap();
        snapshots.save(&snapshot(id, 100, TimerPhase::Running)).unwrap();
        snapshots.clear().unwrap();
        assert!(snapshots.fetch().unwrap().is_none());

        // Clearing an empty table is fine
        snapshots.clear().unwrap();
    }

    #[test_context(SnapshotTestContext)]
    #[test]
    fn test_finalize_commits_entry_and_drops_snapshot_together(_ctx: &mut SnapshotTestContext) {
        let clients = Clients::new().unwrap();
        let id = clients.create("globex", Money::from_cents(50_00), true).unwrap();

        let mut snapshots = Snapshots::new().unwrap();
        snapshots.save(&snapshot(id, 1500, TimerPhase::Running)).unwrap();

        snapshots
            .finalize(&SessionRecord {
                client_id: id,
                start: at(9, 0),
                end: at(9, 30),
                duration: 1500,
                idle: 300,
            })
            .unwrap();

        assert!(snapshots.fetch().unwrap().is_none());
        let entries = Entries::new().unwrap().fetch(&EntryFilter::default()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].duration, 1500);
        assert_eq!(entries[0].idle, 300);
        assert_eq!(entries[0].end, Some(at(9, 30)));
    }

    #[test_context(SnapshotTestContext)]
    #[test]
    fn test_finalize_is_idempotent_for_the_same_session(_ctx: &mut SnapshotTestContext) {
        let clients = Clients::new().unwrap();
        let id = clients.create("globex", Money::from_cents(50_00), true).unwrap();
        let record = SessionRecord {
            client_id: id,
            start: at(9, 0),
            end: at(9, 30),
            duration: 1500,
            idle: 0,
        };

        let mut snapshots = Snapshots::new().unwrap();
        snapshots.finalize(&record).unwrap();
        snapshots.finalize(&record).unwrap();

        let entries = Entries::new().unwrap().fetch(&EntryFilter::default()).unwrap();
        assert_eq!(entries.len(), 1);
    }
}
