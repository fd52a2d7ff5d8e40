#[cfg(test)]
mod tests {
    use billable::db::entries::{EntryDetails, TimeEntry};
    use billable::libs::formatter::{format_currency, format_duration, format_entries, format_hours};
    use billable::libs::money::Money;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 8, 12).unwrap().and_hms_opt(hour, min, 0).unwrap()
    }

    #[test]
    fn test_format_duration_pads_components() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(45), "00:00:45");
        assert_eq!(format_duration(90 * 60), "01:30:00");
        assert_eq!(format_duration(8 * 3600 + 5 * 60 + 9), "08:05:09");
        assert_eq!(format_duration(-30), "00:00:00");
    }

    #[test]
    fn test_format_duration_does_not_wrap_past_a_day() {
        assert_eq!(format_duration(30 * 3600), "30:00:00");
        assert_eq!(format_duration(120 * 3600 + 61), "120:01:01");
    }

    #[test]
    fn test_format_hours_uses_two_decimals() {
        assert_eq!(format_hours(3600), "1.00 hrs");
        assert_eq!(format_hours(5400), "1.50 hrs");
        assert_eq!(format_hours(900), "0.25 hrs");
        assert_eq!(format_hours(0), "0.00 hrs");
        assert_eq!(format_hours(-60), "0.00 hrs");
    }

    #[test]
    fn test_format_currency_groups_thousands() {
        assert_eq!(format_currency(Money::ZERO), "$0.00");
        assert_eq!(format_currency(Money::from_cents(5)), "$0.05");
        assert_eq!(format_currency(Money::from_cents(50_00)), "$50.00");
        assert_eq!(format_currency(Money::from_cents(1_234_56)), "$1,234.56");
        assert_eq!(format_currency(Money::from_cents(123_456_789)), "$1,234,567.89");
        assert_eq!(format_currency(Money::from_cents(-9_99)), "-$9.99");
    }

    #[test]
    fn test_format_entries_renders_billed_and_open_rows() {
        let billed = EntryDetails {
            entry: TimeEntry {
                id: 1,
                client_id: 10,
                start: at(9, 0),
                end: Some(at(11, 30)),
                duration: 9000,
                idle: 120,
                invoice_id: Some(4),
            },
            client_name: "globex".to_string(),
            invoice_number: Some("INV-0004".to_string()),
            client_rate: Money::from_cents(80_00),
            line_amount: Some(Money::from_cents(125_00)),
        };
        let open = EntryDetails {
            entry: TimeEntry {
                id: 2,
                client_id: 10,
                start: at(13, 0),
                end: None,
                duration: 1800,
                idle: 0,
                invoice_id: None,
            },
            client_name: "globex".to_string(),
            invoice_number: None,
            client_rate: Money::from_cents(80_00),
            line_amount: None,
        };

        let rows = format_entries(&[billed, open]);

        assert_eq!(rows[0].start, "2030-08-12 09:00");
        assert_eq!(rows[0].end, "2030-08-12 11:30");
        assert_eq!(rows[0].duration, "02:30:00");
        // Frozen line amount wins over the current rate
        assert_eq!(rows[0].amount, "$125.00");
        assert_eq!(rows[0].invoice, "INV-0004");

        assert_eq!(rows[1].end, "-");
        assert_eq!(rows[1].invoice, "-");
        // 0.5h at the current 80.00/h
        assert_eq!(rows[1].amount, "$40.00");
    }
}
