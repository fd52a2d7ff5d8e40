#[cfg(test)]
mod tests {
    use billable::libs::money::Money;

    #[test]
    fn test_parse_accepts_plain_decimal_forms() {
        assert_eq!("125".parse::<Money>().unwrap(), Money::from_cents(125_00));
        assert_eq!("125.5".parse::<Money>().unwrap(), Money::from_cents(125_50));
        assert_eq!("125.50".parse::<Money>().unwrap(), Money::from_cents(125_50));
        assert_eq!("$80.25".parse::<Money>().unwrap(), Money::from_cents(80_25));
        assert_eq!("0.01".parse::<Money>().unwrap(), Money::from_cents(1));
        assert_eq!(".5".parse::<Money>().unwrap(), Money::from_cents(50));
        assert_eq!(" 42 ".parse::<Money>().unwrap(), Money::from_cents(42_00));
    }

    #[test]
    fn test_parse_rejects_malformed_amounts() {
        assert!("".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("12.345".parse::<Money>().is_err());
        assert!("-5".parse::<Money>().is_err());
        assert!("1,000".parse::<Money>().is_err());
        assert!("$".parse::<Money>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let amount = Money::from_cents(1_234_56);
        assert_eq!(amount.to_string(), "1234.56");
        assert_eq!(amount.to_string().parse::<Money>().unwrap(), amount);

        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_for_seconds_prices_exact_hours_exactly() {
        let rate = Money::from_cents(50_00);
        assert_eq!(rate.for_seconds(7200), Money::from_cents(100_00));
        assert_eq!(rate.for_seconds(3600), Money::from_cents(50_00));
        assert_eq!(rate.for_seconds(0), Money::ZERO);
    }

    #[test]
    fn test_for_seconds_rounds_to_nearest_cent() {
        let rate = Money::from_cents(50_00);
        // 1 second at 50.00/h is 1.388 cents, rounding to 1
        assert_eq!(rate.for_seconds(1), Money::from_cents(1));
        // 30 minutes at 99.99/h is 4999.5 cents, rounding half up to 5000
        assert_eq!(Money::from_cents(99_99).for_seconds(1800), Money::from_cents(50_00));
        // 35 minutes at 60.00/h is exactly 35.00
        assert_eq!(Money::from_cents(60_00).for_seconds(2100), Money::from_cents(35_00));
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let total: Money = [Money::from_cents(10_00), Money::from_cents(5_50), Money::from_cents(0_50)].into_iter().sum();
        assert_eq!(total, Money::from_cents(16_00));
        assert_eq!(Money::from_cents(16_00) - Money::from_cents(6_00), Money::from_cents(10_00));
        assert!(Money::from_cents(1).is_positive());
        assert!(!Money::ZERO.is_positive());
        assert!(Money::from_cents(-1) < Money::ZERO);
    }
}
