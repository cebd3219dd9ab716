//! Core trait defining singleton registry behavior.
//!
//! This module provides the `SingletonApi` trait with default implementations for
//! lazy, shutdown-aware access to one instance per behaviour type.
//!
//! The registry is type-based: each type (`TypeId`) owns exactly one slot, and a
//! slot holds at most one instance for the registry's lifetime.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};

use log::{debug, warn};

use crate::singleton_slot::Access;
use crate::{Behaviour, Host, Lifecycle, SingletonError, SingletonEvent, SingletonSlot, SingletonState};

/// Storage for per-type slots, keyed by the behaviour's `TypeId`.
pub type SlotStorage = LazyLock<Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>>;

/// Storage for the optional trace callback.
pub type TraceCallback = LazyLock<Mutex<Option<Arc<dyn Fn(&SingletonEvent) + Send + Sync>>>>;

/// Core trait defining registry behavior.
///
/// Provides default implementations for all registry operations, requiring only
/// the accessors to the registry's statics (`host`, `slots` and `trace`).
pub trait SingletonApi: Sized + 'static {
    /// Engine collaborator the registry creates and discovers instances through.
    type Host: Host;

    /// Access the host static.
    ///
    /// This method must be implemented to provide access to the registry's host.
    fn host() -> &'static Self::Host;

    /// Access the slot storage static.
    ///
    /// This method must be implemented to provide access to the registry's
    /// per-type slots. The map is locked only to look up or insert a slot.
    fn slots() -> &'static SlotStorage;

    /// Access the trace callback static.
    ///
    /// This method must be implemented to provide access to the registry's trace callback.
    fn trace() -> &'static TraceCallback;

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Set a tracing callback for registry operations.
    ///
    /// The callback must NOT call back into the same registry: it runs while the
    /// trace lock is held.
    fn set_trace_callback(&self, callback: impl Fn(&SingletonEvent) + Send + Sync + 'static) {
        let mut guard = Self::trace().lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clear the tracing callback.
    fn clear_trace_callback(&self) {
        let mut guard = Self::trace().lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    /// Invoke the trace callback, if one is set.
    ///
    /// Associated rather than a method so lifecycle hooks can emit without a
    /// registry value.
    fn emit(event: &SingletonEvent) {
        let guard = Self::trace().lock().unwrap_or_else(|p| p.into_inner());
        if let Some(callback) = guard.as_ref() {
            callback(event);
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Slots
    // -------------------------------------------------------------------------------------------------

    /// Returns the slot for `T`, inserting an empty one on first use.
    ///
    /// A new slot is subscribed to the host's lifecycle notifications for `T`
    /// before it is stored, so quit or destruction of any entity carrying `T`
    /// latches it, including notifications the host already delivered.
    ///
    /// # Lock Poisoning Recovery
    ///
    /// If the storage lock is poisoned, this method automatically recovers.
    /// Slots are inserted fully built, so the map is never left half-updated.
    ///
    /// # Errors
    ///
    /// - The host refused the subscription ([`SingletonError::Construction`])
    /// - The stored slot is not a `SingletonSlot<T>` (not reachable through this API)
    fn slot<T: Behaviour>(&self) -> Result<Arc<SingletonSlot<T>>, SingletonError> {
        let type_name = std::any::type_name::<T>();
        let mut slots = Self::slots().lock().unwrap_or_else(|p| p.into_inner());

        if let Some(existing) = slots.get(&TypeId::of::<T>()) {
            return existing
                .clone()
                .downcast::<SingletonSlot<T>>()
                .map_err(|_| SingletonError::TypeMismatch { type_name });
        }

        let slot = Arc::new(SingletonSlot::<T>::new());
        Self::host()
            .subscribe::<T>(slot.hook(move |cause| Self::on_latched(type_name, cause)))
            .map_err(SingletonError::construction::<T, _>)?;
        slots.insert(TypeId::of::<T>(), slot.clone());

        Ok(slot)
    }

    /// Returns the one live instance of `T`, creating it on first access.
    ///
    /// An entity already carrying `T` in the host is adopted instead of creating
    /// a new one. Once shutdown has begun for `T` this logs a warning and returns
    /// `Ok(None)`. That path briefly takes the registry's slot-map lock to find
    /// the slot, but never the type's guard, so it does not wait for a
    /// construction running in another thread.
    ///
    /// # Errors
    ///
    /// - A host primitive failed during construction ([`SingletonError::Construction`])
    fn instance<T: Behaviour>(&self) -> Result<Option<Arc<T>>, SingletonError> {
        let type_name = std::any::type_name::<T>();
        let slot = self.slot::<T>()?;

        let access = slot.get_or_create(Self::host())?;

        let behaviour = match access {
            Access::Rejected => {
                warn!(
                    "[Singleton] Instance '{}' already destroyed. Returning None.",
                    type_name
                );
                Self::emit(&SingletonEvent::Rejected { type_name });
                return Ok(None);
            }
            Access::Existing(behaviour) => behaviour,
            Access::Adopted(attached) => {
                debug!("adopted existing {} on entity {}", type_name, attached.entity);
                Self::emit(&SingletonEvent::Adopted {
                    type_name,
                    entity: attached.entity,
                });
                attached.behaviour
            }
            Access::Created(attached) => {
                debug!("created {} on entity {}", type_name, attached.entity);
                Self::emit(&SingletonEvent::Created {
                    type_name,
                    entity: attached.entity,
                });
                attached.behaviour
            }
        };

        Self::emit(&SingletonEvent::Get { type_name });
        Ok(Some(behaviour))
    }

    // -------------------------------------------------------------------------------------------------
    // Shutdown
    // -------------------------------------------------------------------------------------------------

    /// Latches shutdown for `T` because the application is quitting.
    ///
    /// Idempotent; also valid before `T` was ever accessed.
    fn on_application_quit<T: Behaviour>(&self) {
        self.latch::<T>(Lifecycle::ApplicationQuit);
    }

    /// Latches shutdown for `T` because its entity is being destroyed.
    ///
    /// Idempotent; also valid before `T` was ever accessed.
    fn on_destroy<T: Behaviour>(&self) {
        self.latch::<T>(Lifecycle::Destroyed);
    }

    #[doc(hidden)]
    fn latch<T: Behaviour>(&self, cause: Lifecycle) {
        if let Ok(slot) = self.slot::<T>() {
            if slot.latch() {
                Self::on_latched(std::any::type_name::<T>(), cause);
            }
        }
    }

    #[doc(hidden)]
    fn on_latched(type_name: &'static str, cause: Lifecycle) {
        debug!("singleton {} shut down ({})", type_name, cause);
        Self::emit(&SingletonEvent::ShutDown { type_name, cause });
    }

    /// Current state of `T`'s slot.
    ///
    /// Never waits on the type's guard: while a first construction is running
    /// in another thread this reports [`SingletonState::Uninitialized`].
    fn state<T: Behaviour>(&self) -> SingletonState {
        self.slot::<T>()
            .map(|slot| slot.state())
            .unwrap_or(SingletonState::Uninitialized)
    }

    /// Whether shutdown has begun for `T`. Lock-free apart from the slot lookup.
    fn is_shut_down<T: Behaviour>(&self) -> bool {
        self.state::<T>() == SingletonState::ShutDown
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
