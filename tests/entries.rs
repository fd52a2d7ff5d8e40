#[cfg(test)]
mod tests {
    use billable::db::clients::Clients;
    use billable::db::entries::{Entries, EntryFilter};
    use billable::db::invoices::Invoices;
    use billable::db::snapshot::Snapshots;
    use billable::libs::billing;
    use billable::libs::config::BillingConfig;
    use billable::libs::engine::SessionRecord;
    use billable::libs::money::Money;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct EntryTestContext {
        _temp_dir: TempDir,
    }

    impl TestContext for EntryTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            std::env::set_var("HOME", temp_dir.path());
            std::env::set_var("LOCALAPPDATA", temp_dir.path());
            EntryTestContext { _temp_dir: temp_dir }
        }
    }

    fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    fn add_entry(client_id: i64, start: NaiveDateTime, duration: i64, idle: i64) {
        let mut snapshots = Snapshots::new().unwrap();
        snapshots
            .finalize(&SessionRecord {
                client_id,
                start,
                end: start + Duration::seconds(duration + idle),
                duration,
                idle,
            })
            .unwrap();
    }

    #[test_context(EntryTestContext)]
    #[test]
    fn test_entries_come_back_ordered_by_start(_ctx: &mut EntryTestContext) {
        let clients = Clients::new().unwrap();
        let id = clients.create("globex", Money::from_cents(50_00), true).unwrap();
        add_entry(id, at(2030, 5, 3, 9), 600, 0);
        add_entry(id, at(2030, 5, 1, 9), 600, 0);
        add_entry(id, at(2030, 5, 2, 9), 600, 0);

        let entries = Entries::new().unwrap().fetch(&EntryFilter::default()).unwrap();
        let starts: Vec<NaiveDateTime> = entries.iter().map(|e| e.start).collect();
        assert_eq!(starts, vec![at(2030, 5, 1, 9), at(2030, 5, 2, 9), at(2030, 5, 3, 9)]);
    }

    #[test_context(EntryTestContext)]
    #[test]
    fn test_client_filter_narrows_results(_ctx: &mut EntryTestContext) {
        let clients = Clients::new().unwrap();
        let a = clients.create("globex", Money::from_cents(50_00), true).unwrap();
        let b = clients.create("initech", Money::from_cents(50_00), true).unwrap();
        add_entry(a, at(2030, 5, 1, 9), 600, 0);
        add_entry(b, at(2030, 5, 1, 10), 600, 0);

        let filter = EntryFilter {
            client_id: Some(a),
            ..Default::default()
        };
        let entries = Entries::new().unwrap().fetch(&filter).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].client_id, a);
    }

    #[test_context(EntryTestContext)]
    #[test]
    fn test_month_range_is_half_open(_ctx: &mut EntryTestContext) {
        let clients = Clients::new().unwrap();
        let id = clients.create("globex", Money::from_cents(50_00), true).unwrap();
        add_entry(id, at(2030, 4, 30, 23), 600, 0);
        add_entry(id, at(2030, 5, 1, 0), 600, 0);
        add_entry(id, at(2030, 5, 31, 23), 600, 0);
        add_entry(id, at(2030, 6, 1, 0), 600, 0);

        let filter = EntryFilter {
            range: Some((at(2030, 5, 1, 0), at(2030, 6, 1, 0))),
            ..Default::default()
        };
        let entries = Entries::new().unwrap().fetch(&filter).unwrap();
        let starts: Vec<NaiveDateTime> = entries.iter().map(|e| e.start).collect();
        assert_eq!(starts, vec![at(2030, 5, 1, 0), at(2030, 5, 31, 23)]);
    }

    #[test_context(EntryTestContext)]
    #[test]
    fn test_uninvoiced_filter_excludes_billed_entries(_ctx: &mut EntryTestContext) {
        let clients = Clients::new().unwrap();
        let id = clients.create("globex", Money::from_cents(50_00), true).unwrap();
        add_entry(id, at(2030, 5, 1, 9), 3600, 0);
        add_entry(id, at(2030, 5, 2, 9), 3600, 0);

        let entries_db = Entries::new().unwrap();
        let backlog = entries_db.fetch_uninvoiced(id).unwrap();
        assert_eq!(backlog.len(), 2);

        let mut invoices = Invoices::new().unwrap();
        billing::build_invoice(&mut invoices, id, &[backlog[0].id], at(2030, 5, 10, 12), &BillingConfig::default()).unwrap();

        let remaining = entries_db.fetch_uninvoiced(id).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, backlog[1].id);
    }

    #[test_context(EntryTestContext)]
    #[test]
    fn test_detailed_view_prices_and_labels_entries(_ctx: &mut EntryTestContext) {
        let clients = Clients::new().unwrap();
        let id = clients.create("globex", Money::from_cents(50_00), true).unwrap();
        add_entry(id, at(2030, 5, 1, 9), 3600, 0);
        add_entry(id, at(2030, 5, 2, 9), 1800, 0);

        let entries_db = Entries::new().unwrap();
        let backlog = entries_db.fetch_uninvoiced(id).unwrap();
        let mut invoices = Invoices::new().unwrap();
        let invoice = billing::build_invoice(&mut invoices, id, &[backlog[0].id], at(2030, 5, 10, 12), &BillingConfig::default()).unwrap();

        // Rate doubles after the invoice was built
        let mut client = clients.fetch_by_id(id).unwrap().unwrap();
        client.rate = Money::from_cents(100_00);
        clients.update(&client).unwrap();

        let details = entries_db.fetch_detailed(&EntryFilter::default()).unwrap();
        assert_eq!(details.len(), 2);

        // Billed entry keeps its frozen line amount
        let billed = &details[0];
        assert_eq!(billed.client_name, "globex");
        assert_eq!(billed.invoice_number.as_deref(), Some(invoice.number.as_str()));
        assert_eq!(billed.amount(), Money::from_cents(50_00));

        // Unbilled entry is previewed at the current rate
        let unbilled = &details[1];
        assert!(unbilled.invoice_number.is_none());
        assert_eq!(unbilled.amount(), Money::from_cents(50_00));
    }

    #[test_context(EntryTestContext)]
    #[test]
    fn test_finalizing_the_same_session_twice_keeps_one_entry(_ctx: &mut EntryTestContext) {
        let clients = Clients::new().unwrap();
        let id = clients.create("globex", Money::from_cents(50_00), true).unwrap();
        let record = SessionRecord {
            client_id: id,
            start: at(2030, 5, 1, 9),
            end: at(2030, 5, 1, 10),
            duration: 3600,
            idle: 0,
        };

        let mut snapshots = Snapshots::new().unwrap();
        snapshots.finalize(&record).unwrap();
        snapshots.finalize(&record).unwrap();

        let entries = Entries::new().unwrap().fetch(&EntryFilter::default()).unwrap();
        assert_eq!(entries.len(), 1);
    }
}
