#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use keytally::db::days::{read_records, temp_path, DayStore};
    use keytally::libs::counter::Rollover;
    use keytally::libs::day::{DayRecord, EventKind};
    use keytally::libs::engine::{Engine, EngineError, FlushSettings};
    use keytally::libs::history::{GapFill, HistoryWindow};
    use parking_lot::Mutex;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};

    struct EngineTestContext {
        _temp_dir: TempDir,
        path: PathBuf,
        today: Arc<Mutex<NaiveDate>>,
    }

    impl AsyncTestContext for EngineTestContext {
        async fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let path = temp_dir.path().join("keytally.txt");
            EngineTestContext {
                _temp_dir: temp_dir,
                path,
                today: Arc::new(Mutex::new(date("2024-01-10"))),
            }
        }
    }

    impl EngineTestContext {
        fn engine(&self) -> Arc<Engine> {
            let store = DayStore::open(&self.path).unwrap();
            let today = Arc::clone(&self.today);
            Arc::new(Engine::new(store, move || *today.lock()))
        }

        fn set_today(&self, s: &str) {
            *self.today.lock() = date(s);
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn quiet_settings() -> FlushSettings {
        FlushSettings {
            interval: Duration::from_secs(3600),
            event_threshold: 0,
        }
    }

    async fn wait_for_content(path: &Path, expected: &str) -> bool {
        for _ in 0..60 {
            if fs::read_to_string(path).map(|c| c == expected).unwrap_or(false) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        false
    }

    #[test_context(EngineTestContext)]
    #[tokio::test]
    async fn test_counts_are_written_on_shutdown(ctx: &mut EngineTestContext) {
        let engine = ctx.engine();
        let task = engine.start(quiet_settings()).unwrap();

        for _ in 0..3 {
            assert!(engine.on_input_event(EventKind::KeyboardPress));
        }
        assert!(engine.on_input_event(EventKind::LeftClick));

        let written = engine.shutdown(task).await.unwrap();

        assert_eq!(written, 1);
        assert_eq!(fs::read_to_string(&ctx.path).unwrap(), "2024-01-10,3,1,0\n");
    }

    #[test_context(EngineTestContext)]
    #[tokio::test]
    async fn test_restart_resumes_todays_counts(ctx: &mut EngineTestContext) {
        fs::write(&ctx.path, "2024-01-10,3,1,0\n").unwrap();
        let engine = ctx.engine();
        let task = engine.start(quiet_settings()).unwrap();

        engine.on_input_event(EventKind::RightClick);

        assert_eq!(engine.snapshot(), vec![DayRecord::with_counts(date("2024-01-10"), 3, 1, 1)]);
        engine.shutdown(task).await.unwrap();
        assert_eq!(fs::read_to_string(&ctx.path).unwrap(), "2024-01-10,3,1,1\n");
    }

    #[test_context(EngineTestContext)]
    #[tokio::test]
    async fn test_day_change_between_events_rolls_over(ctx: &mut EngineTestContext) {
        let engine = ctx.engine();
        let task = engine.start(quiet_settings()).unwrap();

        engine.on_input_event(EventKind::KeyboardPress);
        engine.on_input_event(EventKind::KeyboardPress);
        ctx.set_today("2024-01-11");
        engine.on_input_event(EventKind::LeftClick);

        assert_eq!(engine.current_date(), date("2024-01-11"));
        engine.shutdown(task).await.unwrap();
        assert_eq!(fs::read_to_string(&ctx.path).unwrap(), "2024-01-11,0,1,0\n2024-01-10,2,0,0\n");
    }

    #[test_context(EngineTestContext)]
    #[tokio::test]
    async fn test_start_rolls_over_stale_store(ctx: &mut EngineTestContext) {
        fs::write(&ctx.path, "2024-01-10,5,5,5\n").unwrap();
        ctx.set_today("2024-01-12");
        let engine = ctx.engine();

        let task = engine.start(quiet_settings()).unwrap();

        assert_eq!(
            engine.snapshot(),
            vec![
                DayRecord::new(date("2024-01-12")),
                DayRecord::with_counts(date("2024-01-10"), 5, 5, 5),
            ]
        );
        engine.shutdown(task).await.unwrap();
    }

    #[test_context(EngineTestContext)]
    #[tokio::test]
    async fn test_events_before_start_are_rejected(ctx: &mut EngineTestContext) {
        fs::write(&ctx.path, "2024-01-10,3,1,0\n").unwrap();
        let engine = ctx.engine();

        assert!(!engine.is_accepting());
        assert!(!engine.on_input_event(EventKind::KeyboardPress));

        let task = engine.start(quiet_settings()).unwrap();
        assert!(engine.is_accepting());
        assert_eq!(engine.snapshot(), vec![DayRecord::with_counts(date("2024-01-10"), 3, 1, 0)]);
        engine.shutdown(task).await.unwrap();
    }

    #[test_context(EngineTestContext)]
    #[tokio::test]
    async fn test_events_after_shutdown_are_rejected(ctx: &mut EngineTestContext) {
        let engine = ctx.engine();
        let task = engine.start(quiet_settings()).unwrap();
        engine.on_input_event(EventKind::LeftClick);

        engine.shutdown(task).await.unwrap();

        assert!(!engine.on_input_event(EventKind::LeftClick));
        assert_eq!(engine.snapshot()[0].left_clicks, 1);
    }

    #[test_context(EngineTestContext)]
    #[tokio::test]
    async fn test_concurrent_events_are_all_counted(ctx: &mut EngineTestContext) {
        let engine = ctx.engine();
        let task = engine.start(quiet_settings()).unwrap();

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    let kind = match i % 3 {
                        0 => EventKind::KeyboardPress,
                        1 => EventKind::LeftClick,
                        _ => EventKind::RightClick,
                    };
                    for _ in 0..1000 {
                        engine.on_input_event(kind);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        // Workers 0,3,6 press keys, 1,4,7 left click, 2,5 right click.
        assert_eq!(engine.snapshot(), vec![DayRecord::with_counts(date("2024-01-10"), 3000, 3000, 2000)]);
        engine.shutdown(task).await.unwrap();
    }

    #[test_context(EngineTestContext)]
    #[tokio::test]
    async fn test_recent_history_is_oldest_first(ctx: &mut EngineTestContext) {
        fs::write(
            &ctx.path,
            "2024-01-10,10,0,0\n2024-01-09,9,0,0\n2024-01-08,8,0,0\n2024-01-07,7,0,0\n2024-01-06,6,0,0\n",
        )
        .unwrap();
        let engine = ctx.engine();
        let task = engine.start(quiet_settings()).unwrap();

        let recent = engine.recent_history(3);

        let dates: Vec<NaiveDate> = recent.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date("2024-01-08"), date("2024-01-09"), date("2024-01-10")]);
        assert_eq!(engine.recent_history(30).len(), 5);
        engine.shutdown(task).await.unwrap();
    }

    #[test_context(EngineTestContext)]
    #[tokio::test]
    async fn test_recent_history_with_single_day(ctx: &mut EngineTestContext) {
        let engine = ctx.engine();
        let task = engine.start(quiet_settings()).unwrap();

        assert_eq!(engine.recent_history(7), vec![DayRecord::new(date("2024-01-10"))]);
        assert!(engine.recent_history(0).is_empty());
        engine.shutdown(task).await.unwrap();
    }

    #[test_context(EngineTestContext)]
    #[tokio::test]
    async fn test_clock_skew_counts_on_current_day(ctx: &mut EngineTestContext) {
        let engine = ctx.engine();
        let task = engine.start(quiet_settings()).unwrap();

        ctx.set_today("2024-01-09");
        engine.on_input_event(EventKind::KeyboardPress);

        assert_eq!(engine.current_date(), date("2024-01-10"));
        assert_eq!(engine.snapshot(), vec![DayRecord::with_counts(date("2024-01-10"), 1, 0, 0)]);
        assert_eq!(
            engine.rollover_check(date("2024-01-08")),
            Rollover::ClockSkew {
                observed: date("2024-01-08")
            }
        );
        engine.shutdown(task).await.unwrap();
    }

    #[test_context(EngineTestContext)]
    #[tokio::test]
    async fn test_future_records_survive_flush(ctx: &mut EngineTestContext) {
        fs::write(&ctx.path, "2024-01-12,4,4,4\n2024-01-09,1,1,1\n").unwrap();
        let engine = ctx.engine();
        let task = engine.start(quiet_settings()).unwrap();

        assert_eq!(engine.snapshot().len(), 2);
        engine.shutdown(task).await.unwrap();

        assert_eq!(
            fs::read_to_string(&ctx.path).unwrap(),
            "2024-01-12,4,4,4\n2024-01-10,0,0,0\n2024-01-09,1,1,1\n"
        );
    }

    #[test_context(EngineTestContext)]
    #[tokio::test]
    async fn test_flushed_state_reloads_identically(ctx: &mut EngineTestContext) {
        let before = {
            let engine = ctx.engine();
            let task = engine.start(quiet_settings()).unwrap();
            engine.on_input_event(EventKind::KeyboardPress);
            ctx.set_today("2024-01-11");
            engine.on_input_event(EventKind::RightClick);
            engine.shutdown(task).await.unwrap();
            engine.snapshot()
        };

        let engine = ctx.engine();
        let task = engine.start(quiet_settings()).unwrap();

        assert_eq!(engine.snapshot(), before);
        engine.shutdown(task).await.unwrap();
    }

    #[test_context(EngineTestContext)]
    #[tokio::test]
    async fn test_manual_flush_writes_snapshot(ctx: &mut EngineTestContext) {
        let engine = ctx.engine();
        let task = engine.start(quiet_settings()).unwrap();
        engine.on_input_event(EventKind::LeftClick);

        assert_eq!(engine.flush(false).unwrap(), 1);

        assert_eq!(read_records(&ctx.path).unwrap(), engine.snapshot());
        engine.shutdown(task).await.unwrap();
    }

    #[test_context(EngineTestContext)]
    #[tokio::test]
    async fn test_periodic_flush_writes_without_shutdown(ctx: &mut EngineTestContext) {
        let engine = ctx.engine();
        let task = engine
            .start(FlushSettings {
                interval: Duration::from_secs(1),
                event_threshold: 0,
            })
            .unwrap();

        engine.on_input_event(EventKind::KeyboardPress);

        assert!(wait_for_content(&ctx.path, "2024-01-10,1,0,0\n").await);
        engine.shutdown(task).await.unwrap();
    }

    #[test_context(EngineTestContext)]
    #[tokio::test]
    async fn test_event_threshold_triggers_early_flush(ctx: &mut EngineTestContext) {
        let engine = ctx.engine();
        let task = engine
            .start(FlushSettings {
                interval: Duration::from_secs(3600),
                event_threshold: 5,
            })
            .unwrap();

        for _ in 0..5 {
            engine.on_input_event(EventKind::RightClick);
        }

        assert!(wait_for_content(&ctx.path, "2024-01-10,0,0,5\n").await);
        engine.shutdown(task).await.unwrap();
    }

    #[test_context(EngineTestContext)]
    #[tokio::test]
    async fn test_flush_failure_keeps_counts_in_memory(ctx: &mut EngineTestContext) {
        let engine = ctx.engine();
        let task = engine.start(quiet_settings()).unwrap();
        engine.on_input_event(EventKind::KeyboardPress);

        // A directory in place of the temporary file makes the write fail.
        fs::create_dir(temp_path(&ctx.path)).unwrap();
        assert!(engine.flush(false).is_err());
        assert_eq!(engine.snapshot()[0].keyboard_presses, 1);

        fs::remove_dir(temp_path(&ctx.path)).unwrap();
        engine.on_input_event(EventKind::KeyboardPress);
        engine.shutdown(task).await.unwrap();
        assert_eq!(fs::read_to_string(&ctx.path).unwrap(), "2024-01-10,2,0,0\n");
    }

    #[test_context(EngineTestContext)]
    #[tokio::test]
    async fn test_history_window_from_engine(ctx: &mut EngineTestContext) {
        fs::write(&ctx.path, "2024-01-08,8,0,0\n").unwrap();
        let engine = ctx.engine();
        let task = engine.start(quiet_settings()).unwrap();
        engine.on_input_event(EventKind::LeftClick);

        let sparse = HistoryWindow::from_engine(&engine, 3, GapFill::Sparse);
        let dense = HistoryWindow::from_engine(&engine, 3, GapFill::Dense);

        assert_eq!(sparse.dates, vec![date("2024-01-08"), date("2024-01-10")]);
        assert_eq!(dense.dates, vec![date("2024-01-08"), date("2024-01-09"), date("2024-01-10")]);
        assert_eq!(dense.keyboard_presses, vec![8, 0, 0]);
        assert_eq!(dense.left_clicks, vec![0, 0, 1]);
        engine.shutdown(task).await.unwrap();
    }

    #[test_context(EngineTestContext)]
    #[tokio::test]
    async fn test_second_start_keeps_live_counts(ctx: &mut EngineTestContext) {
        let engine = ctx.engine();
        let task = engine.start(quiet_settings()).unwrap();
        for _ in 0..3 {
            engine.on_input_event(EventKind::KeyboardPress);
        }
        engine.flush(false).unwrap();
        for _ in 0..2 {
            engine.on_input_event(EventKind::KeyboardPress);
        }

        let again = engine.start(quiet_settings());

        assert!(matches!(again, Err(EngineError::AlreadyStarted)));
        assert_eq!(engine.snapshot()[0].keyboard_presses, 5);
        assert!(engine.is_accepting());
        engine.shutdown(task).await.unwrap();
        assert_eq!(fs::read_to_string(&ctx.path).unwrap(), "2024-01-10,5,0,0\n");
    }

    #[test_context(EngineTestContext)]
    #[tokio::test]
    async fn test_start_after_shutdown_is_refused(ctx: &mut EngineTestContext) {
        let engine = ctx.engine();
        let task = engine.start(quiet_settings()).unwrap();
        engine.shutdown(task).await.unwrap();

        assert!(matches!(engine.start(quiet_settings()), Err(EngineError::AlreadyStarted)));
        assert!(!engine.is_accepting());
    }

    #[test_context(EngineTestContext)]
    #[tokio::test]
    async fn test_failed_start_can_be_retried(ctx: &mut EngineTestContext) {
        let engine = ctx.engine();
        // A directory in place of the data file makes the read fail.
        fs::remove_file(&ctx.path).unwrap();
        fs::create_dir(&ctx.path).unwrap();

        assert!(matches!(engine.start(quiet_settings()), Err(EngineError::Store(_))));
        assert!(!engine.is_accepting());

        fs::remove_dir(&ctx.path).unwrap();
        fs::write(&ctx.path, "2024-01-10,3,1,0\n").unwrap();
        let task = engine.start(quiet_settings()).unwrap();
        assert_eq!(engine.snapshot(), vec![DayRecord::with_counts(date("2024-01-10"), 3, 1, 0)]);
        engine.shutdown(task).await.unwrap();
    }
}
