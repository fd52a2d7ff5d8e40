#[cfg(test)]
mod tests {
    use billable::db::clients::Clients;
    use billable::libs::money::Money;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct ClientTestContext {
        _temp_dir: TempDir,
    }

    impl TestContext for ClientTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            std::env::set_var("HOME", temp_dir.path());
            std::env::set_var("LOCALAPPDATA", temp_dir.path());
            ClientTestContext { _temp_dir: temp_dir }
        }
    }

    #[test_context(ClientTestContext)]
    #[test]
    fn test_create_and_fetch_client(_ctx: &mut ClientTestContext) {
        let clients = Clients::new().unwrap();
        let id = clients.create("globex", Money::from_cents(95_50), true).unwrap();

        let client = clients.fetch_by_id(id).unwrap().unwrap();
        assert_eq!(client.name, "globex");
        assert_eq!(client.rate, Money::from_cents(95_50));
        assert!(client.track_activity);
        assert!(!client.favorite);
        assert!(!client.archived);

        let by_name = clients.fetch_by_name("globex").unwrap().unwrap();
        assert_eq!(by_name.id, id);
        assert!(clients.fetch_by_name("initech").unwrap().is_none());
    }

    #[test_context(ClientTestContext)]
    #[test]
    fn test_duplicate_name_is_rejected(_ctx: &mut ClientTestContext) {
        let clients = Clients::new().unwrap();
        clients.create("globex", Money::from_cents(95_50), true).unwrap();
        assert!(clients.create("globex", Money::from_cents(80_00), false).is_err());
    }

    #[test_context(ClientTestContext)]
    #[test]
    fn test_update_changes_rate_and_flags(_ctx: &mut ClientTestContext) {
        let clients = Clients::new().unwrap();
        let id = clients.create("globex", Money::from_cents(95_50), true).unwrap();

        let mut client = clients.fetch_by_id(id).unwrap().unwrap();
        client.rate = Money::from_cents(120_00);
        client.track_activity = false;
        client.favorite = true;
        clients.update(&client).unwrap();

        let reloaded = clients.fetch_by_id(id).unwrap().unwrap();
        assert_eq!(reloaded.rate, Money::from_cents(120_00));
        assert!(!reloaded.track_activity);
        assert!(reloaded.favorite);
    }

    #[test_context(ClientTestContext)]
    #[test]
    fn test_archive_hides_client_from_active_list(_ctx: &mut ClientTestContext) {
        let clients = Clients::new().unwrap();
        let keep = clients.create("globex", Money::from_cents(95_50), true).unwrap();
        let gone = clients.create("initech", Money::from_cents(60_00), true).unwrap();

        clients.archive(gone).unwrap();

        let active = clients.fetch_all(false).unwrap();
        assert_eq!(active.iter().map(|c| c.id).collect::<Vec<_>>(), vec![keep]);

        // Still reachable directly and in the full list
        assert!(clients.fetch_by_id(gone).unwrap().unwrap().archived);
        assert_eq!(clients.fetch_all(true).unwrap().len(), 2);
    }

    #[test_context(ClientTestContext)]
    #[test]
    fn test_favorites_sort_before_the_rest(_ctx: &mut ClientTestContext) {
        let clients = Clients::new().unwrap();
        clients.create("aardvark", Money::from_cents(50_00), true).unwrap();
        let id = clients.create("zebra", Money::from_cents(50_00), true).unwrap();

        let mut zebra = clients.fetch_by_id(id).unwrap().unwrap();
        zebra.favorite = true;
        clients.update(&zebra).unwrap();

        let names: Vec<String> = clients.fetch_all(false).unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["zebra", "aardvark"]);
    }
}
