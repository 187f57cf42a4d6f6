#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use clockin::libs::config::{AttendanceConfig, Config, CONFIG_FILE_NAME};
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct ConfigTestContext {
        _temp_dir: TempDir,
        config_path: PathBuf,
    }

    impl TestContext for ConfigTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let config_path = temp_dir.path().join(CONFIG_FILE_NAME);
            ConfigTestContext {
                _temp_dir: temp_dir,
                config_path,
            }
        }
    }

    #[test]
    fn test_default_attendance_config() {
        let attendance = Config::default().attendance();
        assert_eq!(attendance.utc_offset_minutes, 480);
        assert_eq!(attendance.min_session_minutes, 10);
        assert_eq!(attendance.invalidation_fill_minutes, 30);
        assert_eq!(attendance.auto_close_hour, 23);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_read_nonexistent_config(ctx: &mut ConfigTestContext) {
        let config = Config::read_from(&ctx.config_path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_save_and_read_config(ctx: &mut ConfigTestContext) {
        let config = Config {
            attendance: Some(AttendanceConfig {
                utc_offset_minutes: -300,
                min_session_minutes: 5,
                invalidation_fill_minutes: 15,
                auto_close_hour: 22,
            }),
        };
        config.save_to(&ctx.config_path).unwrap();

        let read_config = Config::read_from(&ctx.config_path).unwrap();
        assert_eq!(read_config, config);
        assert_eq!(read_config.attendance().auto_close_hour, 22);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_malformed_config_is_an_error(ctx: &mut ConfigTestContext) {
        std::fs::write(&ctx.config_path, "{ not json").unwrap();
        assert!(Config::read_from(&ctx.config_path).is_err());
    }

    #[test]
    fn test_offset_and_localize() {
        let attendance = AttendanceConfig::default();
        assert_eq!(attendance.offset().unwrap().local_minus_utc(), 8 * 3600);

        let instant = Utc.with_ymd_and_hms(2024, 3, 4, 16, 30, 0).unwrap();
        let local = attendance.localize(instant).unwrap();
        assert_eq!(local.format("%Y-%m-%d %H:%M").to_string(), "2024-03-05 00:30");

        let broken = AttendanceConfig {
            utc_offset_minutes: 24 * 60,
            ..AttendanceConfig::default()
        };
        assert!(broken.offset().is_err());
        assert!(broken.now().is_err());
    }
}
