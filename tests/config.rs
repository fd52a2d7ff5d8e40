#[cfg(test)]
mod tests {
    use billable::libs::config::{BillingConfig, Config, TimerConfig};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct ConfigTestContext {
        _temp_dir: TempDir,
    }

    impl TestContext for ConfigTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            std::env::set_var("HOME", temp_dir.path());
            std::env::set_var("LOCALAPPDATA", temp_dir.path());
            ConfigTestContext { _temp_dir: temp_dir }
        }
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_missing_file_yields_defaults(_ctx: &mut ConfigTestContext) {
        let config = Config::read().unwrap();
        assert!(config.timer.is_none());
        assert!(config.billing.is_none());

        // Effective values come from the module defaults
        let timer = config.timer.unwrap_or_default();
        assert_eq!(timer.inactivity_timeout_minutes, 10);
        assert_eq!(timer.autosave_interval_seconds, 30);
        assert_eq!(timer.poll_interval_ms, 1000);
        assert_eq!(config.billing.unwrap_or_default().payment_terms_days, 30);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_save_and_read_round_trip(_ctx: &mut ConfigTestContext) {
        let config = Config {
            timer: Some(TimerConfig {
                inactivity_timeout_minutes: 5,
                autosave_interval_seconds: 15,
                poll_interval_ms: 500,
            }),
            billing: Some(BillingConfig { payment_terms_days: 14 }),
        };
        config.save().unwrap();

        let loaded = Config::read().unwrap();
        assert_eq!(loaded.timer, Some(TimerConfig {
            inactivity_timeout_minutes: 5,
            autosave_interval_seconds: 15,
            poll_interval_ms: 500,
        }));
        assert_eq!(loaded.billing.unwrap().payment_terms_days, 14);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_partial_file_leaves_other_modules_unset(_ctx: &mut ConfigTestContext) {
        let config = Config {
            timer: Some(TimerConfig::default()),
            billing: None,
        };
        config.save().unwrap();

        let loaded = Config::read().unwrap();
        assert!(loaded.timer.is_some());
        assert!(loaded.billing.is_none());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_malformed_file_is_an_error(_ctx: &mut ConfigTestContext) {
        let path = Config::file_path().unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::read().is_err());
    }
}
