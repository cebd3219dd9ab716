//! Integration tests for the diagnostic log lines.
//!
//! NOTE: All tests use #[serial] because they share the process-wide logger
//! installed by `install_capture`.

use engine_singleton::{define_singletons, Behaviour};
use log::{Level, LevelFilter, Log, Metadata, Record};
use serial_test::serial;
use std::sync::{Mutex, Once};

struct Capture {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for Capture {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture {
    records: Mutex::new(Vec::new()),
};

static INSTALL: Once = Once::new();

fn install_capture() {
    INSTALL.call_once(|| {
        log::set_logger(&CAPTURE).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });
    CAPTURE.records.lock().unwrap().clear();
}

fn warnings() -> Vec<String> {
    CAPTURE
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|(level, _)| *level == Level::Warn)
        .map(|(_, message)| message.clone())
        .collect()
}

define_singletons!(logged);
define_singletons!(logged_quiet);

#[derive(Default)]
struct Matchmaker;
impl Behaviour for Matchmaker {}

#[test]
#[serial]
fn test_post_shutdown_access_logs_warning() {
    install_capture();

    logged::instance::<Matchmaker>().unwrap().unwrap();
    logged::host().quit();
    assert!(logged::instance::<Matchmaker>().unwrap().is_none());

    let warnings = warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0],
        format!(
            "[Singleton] Instance '{}' already destroyed. Returning None.",
            std::any::type_name::<Matchmaker>()
        )
    );
}

#[test]
#[serial]
fn test_live_access_does_not_warn() {
    install_capture();

    logged_quiet::instance::<Matchmaker>().unwrap().unwrap();
    logged_quiet::instance::<Matchmaker>().unwrap().unwrap();

    assert!(warnings().is_empty());

    let records = CAPTURE.records.lock().unwrap();
    assert!(records
        .iter()
        .any(|(level, message)| *level == Level::Debug && message.starts_with("created ")));
}
