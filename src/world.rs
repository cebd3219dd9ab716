//! In-process reference [`Host`].
//!
//! `World` keeps entities, their behaviours and the per-type lifecycle hooks
//! in one locked table. It models the parts of an engine a singleton registry relies
//! on: entity creation, persistence across scene loads, destruction and
//! application quit.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use log::trace;
use thiserror::Error;

use crate::{Attached, Behaviour, EntityId, Host, Lifecycle, LifecycleHook};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("no entity {0} in world")]
    NoSuchEntity(EntityId),

    #[error("world is quitting, entity creation refused")]
    Quitting,

    #[error("entity {entity} already carries {type_name}")]
    DuplicateComponent {
        entity: EntityId,
        type_name: &'static str,
    },
}

struct EntityRecord {
    name: String,
    persistent: bool,
    components: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl EntityRecord {
    fn new(name: &str) -> Self {
        EntityRecord {
            name: name.to_string(),
            persistent: false,
            components: HashMap::new(),
        }
    }
}

#[derive(Default)]
struct WorldState {
    next_id: u64,
    entities: BTreeMap<EntityId, EntityRecord>,
    hooks: HashMap<TypeId, Vec<LifecycleHook>>,
    // Behaviour types that have lost at least one carrier, replayed to late subscribers.
    destroyed: HashSet<TypeId>,
    quitting: bool,
    scene: u64,
}

impl WorldState {
    /// Records the destruction of `record` and returns the hooks to notify.
    fn destroyed_hooks(&mut self, record: &EntityRecord) -> Vec<LifecycleHook> {
        let mut hooks = Vec::new();
        for type_id in record.components.keys() {
            self.destroyed.insert(*type_id);
            if let Some(subscribed) = self.hooks.get(type_id) {
                hooks.extend(subscribed.iter().cloned());
            }
        }
        hooks
    }

    fn record_mut(&mut self, entity: EntityId) -> Result<&mut EntityRecord, WorldError> {
        self.entities
            .get_mut(&entity)
            .ok_or(WorldError::NoSuchEntity(entity))
    }
}

/// Entity store with scene transitions and lifecycle notifications.
///
/// Hooks are always invoked after the world's lock is released, so a hook may
/// call back into the world.
#[derive(Default)]
pub struct World {
    state: Mutex<WorldState>,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("World")
            .field("entities", &state.entities.len())
            .field("scene", &state.scene)
            .field("quitting", &state.quitting)
            .finish()
    }
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, WorldState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Creates a bare, non-persistent entity.
    pub fn spawn(&self, name: &str) -> Result<EntityId, WorldError> {
        let mut state = self.lock();
        if state.quitting {
            return Err(WorldError::Quitting);
        }

        state.next_id += 1;
        let entity = EntityId(state.next_id);
        state.entities.insert(entity, EntityRecord::new(name));

        trace!("spawned entity {} '{}'", entity, name);
        Ok(entity)
    }

    /// Constructs `T` and attaches it to `entity`. One behaviour per type per entity.
    pub fn add_component<T: Behaviour>(&self, entity: EntityId) -> Result<Arc<T>, WorldError> {
        let mut state = self.lock();
        let record = state.record_mut(entity)?;

        let type_id = TypeId::of::<T>();
        if record.components.contains_key(&type_id) {
            return Err(WorldError::DuplicateComponent {
                entity,
                type_name: std::any::type_name::<T>(),
            });
        }

        let behaviour = Arc::new(T::default());
        record.components.insert(type_id, behaviour.clone());

        trace!("attached {} to {}", std::any::type_name::<T>(), entity);
        Ok(behaviour)
    }

    /// Returns the behaviour `T` attached to `entity`, if any.
    pub fn component<T: Behaviour>(&self, entity: EntityId) -> Option<Arc<T>> {
        let state = self.lock();
        state
            .entities
            .get(&entity)?
            .components
            .get(&TypeId::of::<T>())
            .cloned()?
            .downcast::<T>()
            .ok()
    }

    /// Removes `entity` and notifies the hooks of every behaviour it carried
    /// with [`Lifecycle::Destroyed`].
    pub fn destroy(&self, entity: EntityId) -> Result<(), WorldError> {
        let (record, hooks) = {
            let mut state = self.lock();
            let record = state
                .entities
                .remove(&entity)
                .ok_or(WorldError::NoSuchEntity(entity))?;
            let hooks = state.destroyed_hooks(&record);
            (record, hooks)
        };

        trace!("destroyed entity {} '{}'", entity, record.name);
        notify(&hooks, Lifecycle::Destroyed);
        Ok(())
    }

    /// Moves to the next scene, destroying every non-persistent entity.
    ///
    /// Returns the number of destroyed entities.
    pub fn load_scene(&self) -> usize {
        let (removed, hooks) = {
            let mut state = self.lock();
            state.scene += 1;

            let doomed: Vec<EntityId> = state
                .entities
                .iter()
                .filter(|(_, record)| !record.persistent)
                .map(|(id, _)| *id)
                .collect();

            let removed: Vec<EntityRecord> = doomed
                .into_iter()
                .filter_map(|id| state.entities.remove(&id))
                .collect();
            let hooks: Vec<LifecycleHook> = removed
                .iter()
                .flat_map(|record| state.destroyed_hooks(record))
                .collect();
            (removed.len(), hooks)
        };

        trace!("scene loaded, {} entities destroyed", removed);
        notify(&hooks, Lifecycle::Destroyed);
        removed
    }

    /// Begins application quit: every hook receives [`Lifecycle::ApplicationQuit`]
    /// and further entity creation is refused. Entities are left in place.
    ///
    /// Hooks subscribed afterwards receive the notification on subscription.
    pub fn quit(&self) {
        let hooks: Vec<LifecycleHook> = {
            let mut state = self.lock();
            state.quitting = true;
            state.hooks.values().flatten().cloned().collect()
        };

        trace!("world quitting, notifying {} hooks", hooks.len());
        notify(&hooks, Lifecycle::ApplicationQuit);
    }

    pub fn is_quitting(&self) -> bool {
        self.lock().quitting
    }

    /// Number of scene loads so far.
    pub fn scene(&self) -> u64 {
        self.lock().scene
    }

    pub fn entity_count(&self) -> usize {
        self.lock().entities.len()
    }

    pub fn entity_name(&self, entity: EntityId) -> Option<String> {
        self.lock().entities.get(&entity).map(|r| r.name.clone())
    }

    pub fn is_persistent(&self, entity: EntityId) -> Option<bool> {
        self.lock().entities.get(&entity).map(|r| r.persistent)
    }

    /// Number of live entities carrying behaviour `T`.
    pub fn count_with<T: Behaviour>(&self) -> usize {
        let type_id = TypeId::of::<T>();
        self.lock()
            .entities
            .values()
            .filter(|record| record.components.contains_key(&type_id))
            .count()
    }
}

fn notify(hooks: &[LifecycleHook], event: Lifecycle) {
    for hook in hooks {
        hook(event);
    }
}

impl Host for World {
    type Error = WorldError;

    fn find_existing<T: Behaviour>(&self) -> Option<Attached<T>> {
        let type_id = TypeId::of::<T>();
        let state = self.lock();

        // Lowest id first, so the earliest placed entity wins.
        state.entities.iter().find_map(|(entity, record)| {
            let behaviour = record.components.get(&type_id)?.clone().downcast::<T>().ok()?;
            Some(Attached {
                entity: *entity,
                behaviour,
            })
        })
    }

    fn create_entity(&self, name: &str) -> Result<EntityId, WorldError> {
        self.spawn(name)
    }

    fn attach<T: Behaviour>(&self, entity: EntityId) -> Result<Arc<T>, WorldError> {
        self.add_component::<T>(entity)
    }

    fn mark_persistent(&self, entity: EntityId) -> Result<(), WorldError> {
        self.lock().record_mut(entity)?.persistent = true;
        Ok(())
    }

    fn subscribe<T: Behaviour>(&self, hook: LifecycleHook) -> Result<(), WorldError> {
        let type_id = TypeId::of::<T>();
        let mut replay = Vec::new();
        {
            let mut state = self.lock();
            if state.destroyed.contains(&type_id) {
                replay.push(Lifecycle::Destroyed);
            }
            if state.quitting {
                replay.push(Lifecycle::ApplicationQuit);
            }
            state.hooks.entry(type_id).or_default().push(hook.clone());
        }

        for event in replay {
            trace!("replaying {} to new {} hook", event, std::any::type_name::<T>());
            hook(event);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct Music;
    impl Behaviour for Music {}

    #[derive(Debug, Default)]
    struct Input;
    impl Behaviour for Input {}

    fn counting_hook(counter: &Arc<AtomicUsize>, expected: Lifecycle) -> LifecycleHook {
        let counter = counter.clone();
        Arc::new(move |event| {
            assert_eq!(event, expected);
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_spawn_and_attach() {
        let world = World::new();
        let entity = world.spawn("speaker").unwrap();
        let music = world.add_component::<Music>(entity).unwrap();

        assert_eq!(world.entity_name(entity).as_deref(), Some("speaker"));
        assert_eq!(world.is_persistent(entity), Some(false));
        assert_eq!(world.count_with::<Music>(), 1);
        assert_eq!(world.count_with::<Input>(), 0);
        assert!(Arc::ptr_eq(&world.component::<Music>(entity).unwrap(), &music));
    }

    #[test]
    fn test_duplicate_component_refused() {
        let world = World::new();
        let entity = world.spawn("speaker").unwrap();
        world.add_component::<Music>(entity).unwrap();

        let err = world.add_component::<Music>(entity).unwrap_err();
        assert!(matches!(err, WorldError::DuplicateComponent { .. }));
    }

    #[test]
    fn test_missing_entity() {
        let world = World::new();
        let ghost = EntityId::from_raw(42);
        assert_eq!(world.destroy(ghost), Err(WorldError::NoSuchEntity(ghost)));
        assert_eq!(world.mark_persistent(ghost), Err(WorldError::NoSuchEntity(ghost)));
        assert_eq!(
            world.add_component::<Music>(ghost).unwrap_err(),
            WorldError::NoSuchEntity(ghost)
        );
        assert_eq!(
            WorldError::NoSuchEntity(ghost).to_string(),
            "no entity #42 in world"
        );
    }

    #[test]
    fn test_find_existing_prefers_earliest() {
        let world = World::new();
        let first = world.spawn("a").unwrap();
        let second = world.spawn("b").unwrap();
        world.add_component::<Music>(second).unwrap();
        let expected = world.add_component::<Music>(first).unwrap();

        let found = world.find_existing::<Music>().unwrap();
        assert_eq!(found.entity, first);
        assert!(Arc::ptr_eq(&found.behaviour, &expected));
        assert!(world.find_existing::<Input>().is_none());
    }

    #[test]
    fn test_load_scene_keeps_persistent() {
        let world = World::new();
        let kept = world.spawn("kept").unwrap();
        let dropped = world.spawn("dropped").unwrap();
        world.mark_persistent(kept).unwrap();
        world.add_component::<Music>(kept).unwrap();
        world.add_component::<Input>(dropped).unwrap();

        let music = Arc::new(AtomicUsize::new(0));
        let input = Arc::new(AtomicUsize::new(0));
        world
            .subscribe::<Music>(counting_hook(&music, Lifecycle::Destroyed))
            .unwrap();
        world
            .subscribe::<Input>(counting_hook(&input, Lifecycle::Destroyed))
            .unwrap();

        assert_eq!(world.load_scene(), 1);
        assert_eq!(world.scene(), 1);
        assert_eq!(world.entity_count(), 1);
        assert_eq!(world.is_persistent(kept), Some(true));
        assert_eq!(world.entity_name(dropped), None);
        assert_eq!(music.load(Ordering::SeqCst), 0);
        assert_eq!(input.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_destroy_notifies_hooks() {
        let world = World::new();
        let first = world.spawn("doomed").unwrap();
        let second = world.spawn("also doomed").unwrap();
        world.add_component::<Music>(first).unwrap();
        world.add_component::<Music>(second).unwrap();
        let destroyed = Arc::new(AtomicUsize::new(0));
        world
            .subscribe::<Music>(counting_hook(&destroyed, Lifecycle::Destroyed))
            .unwrap();

        // Every carrier counts, not only the one a registry would adopt.
        world.destroy(second).unwrap();
        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
        world.destroy(first).unwrap();
        assert_eq!(destroyed.load(Ordering::SeqCst), 2);
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_bare_entity_notifies_nobody() {
        let world = World::new();
        let entity = world.spawn("bare").unwrap();
        let destroyed = Arc::new(AtomicUsize::new(0));
        world
            .subscribe::<Music>(counting_hook(&destroyed, Lifecycle::Destroyed))
            .unwrap();

        world.destroy(entity).unwrap();
        assert_eq!(destroyed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_late_subscriber_receives_replay() {
        let world = World::new();
        let entity = world.spawn("gone").unwrap();
        world.add_component::<Music>(entity).unwrap();
        world.destroy(entity).unwrap();

        let destroyed = Arc::new(AtomicUsize::new(0));
        world
            .subscribe::<Music>(counting_hook(&destroyed, Lifecycle::Destroyed))
            .unwrap();
        assert_eq!(destroyed.load(Ordering::SeqCst), 1);

        world.quit();
        let quit = Arc::new(AtomicUsize::new(0));
        world
            .subscribe::<Input>(counting_hook(&quit, Lifecycle::ApplicationQuit))
            .unwrap();
        assert_eq!(quit.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_quit_notifies_and_refuses_creation() {
        let world = World::new();
        world.spawn("app").unwrap();
        let quit = Arc::new(AtomicUsize::new(0));
        world
            .subscribe::<Music>(counting_hook(&quit, Lifecycle::ApplicationQuit))
            .unwrap();

        world.quit();
        assert!(world.is_quitting());
        assert_eq!(quit.load(Ordering::SeqCst), 1);
        assert_eq!(world.entity_count(), 1);
        assert_eq!(world.spawn("late"), Err(WorldError::Quitting));
    }

    #[test]
    fn test_hook_may_reenter_world() {
        let world = Arc::new(World::new());
        let entity = world.spawn("reentrant").unwrap();
        world.add_component::<Music>(entity).unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        let (world_clone, seen_clone) = (world.clone(), seen.clone());
        world
            .subscribe::<Music>(
                Arc::new(move |_| {
                    seen_clone.store(world_clone.entity_count(), Ordering::SeqCst);
                }),
            )
            .unwrap();
        world.spawn("other").unwrap();

        world.destroy(entity).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
