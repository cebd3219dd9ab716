//! The engine-side collaborator a singleton registry is bound to.
//!
//! A registry never creates or destroys entities itself. Everything it needs
//! from the surrounding runtime goes through the [`Host`] trait: finding an
//! entity that already carries a behaviour, creating a fresh entity, attaching
//! a behaviour to it, keeping it alive across scene transitions, and telling
//! the registry when the application quits or an entity carrying the behaviour
//! is destroyed.

use std::fmt;
use std::sync::Arc;

use crate::Behaviour;

/// Opaque handle to a host-managed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub(crate) u64);

impl EntityId {
    /// Builds a handle from a raw host identifier.
    pub const fn from_raw(raw: u64) -> Self {
        EntityId(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle notifications a host delivers to subscribed hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// The application has begun quitting.
    ApplicationQuit,
    /// An entity carrying the subscribed behaviour is being destroyed.
    Destroyed,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::ApplicationQuit => write!(f, "application quit"),
            Lifecycle::Destroyed => write!(f, "destroyed"),
        }
    }
}

/// Callback a host invokes when a lifecycle notification reaches a behaviour type.
pub type LifecycleHook = Arc<dyn Fn(Lifecycle) + Send + Sync + 'static>;

/// A behaviour together with the entity it is attached to.
#[derive(Debug)]
pub struct Attached<T> {
    pub entity: EntityId,
    pub behaviour: Arc<T>,
}

// Manual impl: `T` itself need not be `Clone`.
impl<T> Clone for Attached<T> {
    fn clone(&self) -> Self {
        Attached {
            entity: self.entity,
            behaviour: Arc::clone(&self.behaviour),
        }
    }
}

/// Entity-lifecycle facility supplied by the surrounding runtime.
///
/// Implementations must be shareable across threads. A registry calls into its
/// host while holding the per-type guard (construction) or its slot map
/// (`subscribe`), so none of these methods may call back into the same registry.
pub trait Host: Send + Sync + 'static {
    /// Failure type of the host's construction primitives.
    ///
    /// Propagated to callers of `instance` wrapped in
    /// [`SingletonError::Construction`](crate::SingletonError::Construction).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Locates the live entity carrying behaviour `T`, if there is one.
    fn find_existing<T: Behaviour>(&self) -> Option<Attached<T>>;

    /// Creates a bare entity with the given diagnostic name.
    fn create_entity(&self, name: &str) -> Result<EntityId, Self::Error>;

    /// Constructs `T` and attaches it to `entity`.
    fn attach<T: Behaviour>(&self, entity: EntityId) -> Result<Arc<T>, Self::Error>;

    /// Keeps `entity` alive across scene transitions.
    fn mark_persistent(&self, entity: EntityId) -> Result<(), Self::Error>;

    /// Registers `hook` to receive lifecycle notifications for behaviour `T`.
    ///
    /// The hook receives [`Lifecycle::ApplicationQuit`] when the application
    /// quits and [`Lifecycle::Destroyed`] whenever any entity carrying `T` is
    /// destroyed, whether or not a registry ever handed that entity out.
    /// Notifications that already happened before the subscription are
    /// replayed to the new hook.
    fn subscribe<T: Behaviour>(&self, hook: LifecycleHook) -> Result<(), Self::Error>;
}
