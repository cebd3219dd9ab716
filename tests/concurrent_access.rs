//! Integration tests for concurrent first access.

use engine_singleton::{define_singletons, Behaviour};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

define_singletons!(racing);
define_singletons!(racing_quit);

const THREADS: usize = 16;

static BUILT: AtomicUsize = AtomicUsize::new(0);

struct SlowLoader;

impl Default for SlowLoader {
    fn default() -> Self {
        BUILT.fetch_add(1, Ordering::SeqCst);
        // Widen the window in which other threads contend for the guard.
        thread::sleep(Duration::from_millis(20));
        SlowLoader
    }
}

impl Behaviour for SlowLoader {}

#[test]
fn test_concurrent_callers_share_one_instance() {
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                racing::instance::<SlowLoader>().unwrap().unwrap()
            })
        })
        .collect();

    let instances: Vec<Arc<SlowLoader>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(BUILT.load(Ordering::SeqCst), 1);
    assert_eq!(racing::host().count_with::<SlowLoader>(), 1);
    for instance in &instances[1..] {
        assert!(Arc::ptr_eq(&instances[0], instance));
    }
}

#[test]
fn test_callers_after_concurrent_quit_see_none() {
    #[derive(Default)]
    struct Streamer;
    impl Behaviour for Streamer {}

    racing_quit::instance::<Streamer>().unwrap().unwrap();

    let barrier = Arc::new(Barrier::new(THREADS + 1));
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                if i % 2 == 0 {
                    racing_quit::on_application_quit::<Streamer>();
                } else {
                    racing_quit::on_destroy::<Streamer>();
                }
            })
        })
        .collect();

    barrier.wait();
    for handle in handles {
        handle.join().unwrap();
    }

    let late: Vec<_> = (0..THREADS)
        .map(|_| thread::spawn(|| racing_quit::instance::<Streamer>().unwrap().is_none()))
        .collect();
    for handle in late {
        assert!(handle.join().unwrap());
    }
}
