//! Scene transitions and tracing for engine-singleton.
//!
//! Demonstrates:
//! - Adopting a hand-placed entity instead of creating a new one
//! - Persistence of singleton entities across scene loads
//! - Monitoring a registry with a trace callback
//! - Shutdown when the singleton's entity is destroyed
//!
//! Run with: `RUST_LOG=trace cargo run --example scene_transitions`

use engine_singleton::{define_singletons, Behaviour, Host};

define_singletons!(level);

#[derive(Debug, Default)]
struct MusicPlayer;
impl Behaviour for MusicPlayer {}

#[derive(Debug, Default)]
struct QuestLog;
impl Behaviour for QuestLog {}

fn main() {
    pretty_env_logger::init();

    println!("=== engine-singleton: Scene Transitions ===\n");

    level::set_trace_callback(|event| println!("   [trace] {}", event));

    let world = level::host();

    // The level designer placed a quest log by hand.
    let designer_entity = world.spawn("Quest Log").expect("world is running");
    world
        .add_component::<QuestLog>(designer_entity)
        .expect("fresh entity");
    world.spawn("Terrain").expect("world is running");

    println!("1. Accessing singletons...");
    level::instance::<MusicPlayer>().unwrap();
    level::instance::<QuestLog>().unwrap();
    println!("   Entities: {}", world.entity_count());

    // The hand-placed quest log is not persistent, so this load destroys it
    // and latches its shutdown.
    println!("\n2. Loading the next scene...");
    let destroyed = world.load_scene();
    println!("   Destroyed {} entities, {} remain", destroyed, world.entity_count());
    println!("   MusicPlayer: {}", level::state::<MusicPlayer>());
    println!("   QuestLog: {}", level::state::<QuestLog>());

    println!("\n3. Accessing after the scene load...");
    println!(
        "   MusicPlayer present: {}",
        level::instance::<MusicPlayer>().unwrap().is_some()
    );
    println!(
        "   QuestLog present: {}",
        level::instance::<QuestLog>().unwrap().is_some()
    );

    println!("\n4. Destroying the music player's entity...");
    if let Some(found) = world.find_existing::<MusicPlayer>() {
        world.destroy(found.entity).expect("entity is live");
    }
    println!(
        "   MusicPlayer present: {}",
        level::instance::<MusicPlayer>().unwrap().is_some()
    );

    level::clear_trace_callback();
    println!("\n=== Example completed successfully! ===");
}
