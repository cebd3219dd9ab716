//! Basic usage example for engine-singleton.
//!
//! Demonstrates:
//! - Lazy creation on first access
//! - Identity of successive accesses
//! - `T::instance()` through the `Singleton` trait
//! - `None` after the application quits
//!
//! Run with: `RUST_LOG=debug cargo run --example basic_usage`

use engine_singleton::{define_singletons, Behaviour, Host, Singleton};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

// Create an isolated registry backed by an in-process world
define_singletons!(app);

#[derive(Debug, Default)]
struct ScoreKeeper {
    points: AtomicU32,
}

impl Behaviour for ScoreKeeper {}

impl Singleton for ScoreKeeper {
    type Registry = app::Api;
}

fn main() {
    pretty_env_logger::init();

    println!("=== engine-singleton: Basic Usage ===\n");

    // -------------------------------------------------------------------------
    // 1. First access creates the instance
    // -------------------------------------------------------------------------
    println!("1. First access...");

    let keeper = ScoreKeeper::instance()
        .expect("world accepts new entities")
        .expect("application is running");
    keeper.points.fetch_add(10, Ordering::SeqCst);

    let world = app::host();
    if let Some(found) = world.find_existing::<ScoreKeeper>() {
        println!(
            "   Created entity {} named {:?}, persistent: {:?}",
            found.entity,
            world.entity_name(found.entity).unwrap_or_default(),
            world.is_persistent(found.entity)
        );
    }

    // -------------------------------------------------------------------------
    // 2. Later accesses return the same instance
    // -------------------------------------------------------------------------
    println!("\n2. Second access...");

    let again: Arc<ScoreKeeper> = app::instance().unwrap().unwrap();
    again.points.fetch_add(5, Ordering::SeqCst);
    println!(
        "   Same instance: {}, points: {}",
        Arc::ptr_eq(&keeper, &again),
        keeper.points.load(Ordering::SeqCst)
    );

    // -------------------------------------------------------------------------
    // 3. After quit, access yields None
    // -------------------------------------------------------------------------
    println!("\n3. Quitting...");

    world.quit();
    println!("   State: {}", app::state::<ScoreKeeper>());
    println!("   Access after quit: {:?}", ScoreKeeper::instance().unwrap());

    println!("\n=== Example completed successfully! ===");
}
