//! Capabilities a type needs to be managed as a singleton.

use std::sync::Arc;

use crate::{SingletonApi, SingletonError};

/// Suffix appended to the type name when a registry names the entity it creates.
pub const SINGLETON_SUFFIX: &str = "(Singleton)";

/// An engine-managed behaviour: constructible without arguments by the host and
/// shareable across threads.
pub trait Behaviour: Default + Send + Sync + 'static {}

/// Gives a concrete behaviour a `T::instance()` accessor backed by a registry.
///
/// # Examples
///
/// ```rust
/// use engine_singleton::{define_singletons, Behaviour, Singleton};
///
/// define_singletons!(game);
///
/// #[derive(Default)]
/// struct AudioManager;
///
/// impl Behaviour for AudioManager {}
///
/// impl Singleton for AudioManager {
///     type Registry = game::Api;
/// }
///
/// let first = AudioManager::instance().unwrap().unwrap();
/// let second = AudioManager::instance().unwrap().unwrap();
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// ```
pub trait Singleton: Behaviour {
    /// Registry holding this type's slot.
    type Registry: SingletonApi + Default;

    /// Returns the live instance, creating it on first access.
    ///
    /// `Ok(None)` once the application has begun shutting down.
    fn instance() -> Result<Option<Arc<Self>>, SingletonError> {
        Self::Registry::default().instance::<Self>()
    }
}

/// Diagnostic name given to an entity created for `T`.
pub fn entity_name<T: ?Sized>() -> String {
    format!("{} {}", std::any::type_name::<T>(), SINGLETON_SUFFIX)
}
