#[cfg(test)]
mod tests {
    use clockin::db::db::Db;
    use clockin::db::migrations::{get_db_version, needs_migration, MigrationManager};
    use rusqlite::Connection;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct MigrationTestContext {
        _temp_dir: TempDir,
        db_path: PathBuf,
    }

    impl TestContext for MigrationTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db_path = temp_dir.path().join("clockin.db");
            MigrationTestContext {
                _temp_dir: temp_dir,
                db_path,
            }
        }
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migrations_run_automatically(ctx: &mut MigrationTestContext) {
        let db = Db::open(&ctx.db_path).unwrap();

        assert_eq!(get_db_version(&db.conn).unwrap(), MigrationManager::new().latest_version());
        assert!(!needs_migration(&db.conn).unwrap());
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_fresh_database_needs_migration(ctx: &mut MigrationTestContext) {
        let conn = Connection::open(&ctx.db_path).unwrap();
        assert_eq!(get_db_version(&conn).unwrap(), 0);
        assert!(needs_migration(&conn).unwrap());
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migration_history(ctx: &mut MigrationTestContext) {
        let mut conn = Connection::open(&ctx.db_path).unwrap();
        let manager = MigrationManager::new();
        manager.run_migrations(&mut conn).unwrap();

        let history = manager.get_migration_history(&conn).unwrap();
        let names: Vec<&str> = history.iter().map(|(_, name, _)| name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "create_accounts_and_activities",
                "add_time_adjustments",
                "add_account_versions",
                "add_auto_closed_flag"
            ]
        );
        for (i, (version, _, _)) in history.iter().enumerate() {
            assert_eq!(*version as usize, i + 1);
        }
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migration_idempotency(ctx: &mut MigrationTestContext) {
        drop(Db::open(&ctx.db_path).unwrap());
        let db = Db::open(&ctx.db_path).unwrap();

        let history = MigrationManager::new().get_migration_history(&db.conn).unwrap();
        assert_eq!(history.len() as u32, MigrationManager::new().latest_version());
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_second_open_record_is_rejected_by_schema(ctx: &mut MigrationTestContext) {
        let db = Db::open(&ctx.db_path).unwrap();
        db.conn
            .execute("INSERT INTO accounts (id, school_id, name) VALUES ('42', '2021-0042', 'Ada')", [])
            .unwrap();

        let insert = "INSERT INTO activities (account_id, time_in, created_at) VALUES ('42', '2024-03-04 00:00:00+00:00', '2024-03-04 00:00:00+00:00')";
        db.conn.execute(insert, []).unwrap();
        assert!(db.conn.execute(insert, []).is_err());
    }
}
