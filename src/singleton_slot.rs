//! Per-type singleton record.
//!
//! One [`SingletonSlot`] exists per behaviour type per registry. It owns the
//! instance reference, the shutdown latch and the guard that serialises the
//! check-discover-create sequence. State queries read atomics only and never
//! wait on the guard.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::{behaviour, Attached, Behaviour, EntityId, Host, Lifecycle, LifecycleHook, SingletonError};

/// Observable state of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingletonState {
    /// No instance has been handed out yet.
    Uninitialized,
    /// An instance exists and is being handed out.
    Live,
    /// Shutdown has begun. Terminal.
    ShutDown,
}

impl fmt::Display for SingletonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SingletonState::Uninitialized => write!(f, "uninitialized"),
            SingletonState::Live => write!(f, "live"),
            SingletonState::ShutDown => write!(f, "shut down"),
        }
    }
}

/// Outcome of a single access, before events are emitted.
#[derive(Debug)]
pub(crate) enum Access<T> {
    Rejected,
    Existing(Arc<T>),
    Adopted(Attached<T>),
    Created(Attached<T>),
}

/// Instance reference, shutdown latch and guard for one behaviour type.
#[derive(Debug)]
pub struct SingletonSlot<T> {
    instance: Mutex<Option<Attached<T>>>,
    // Set once the instance is stored; mirrors `instance.is_some()`.
    live: AtomicBool,
    shut_down: AtomicBool,
}

impl<T> Default for SingletonSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SingletonSlot<T> {
    pub const fn new() -> Self {
        SingletonSlot {
            instance: Mutex::new(None),
            live: AtomicBool::new(false),
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Latches the shutdown flag. Returns `true` only for the call that set it.
    pub fn latch(&self) -> bool {
        !self.shut_down.swap(true, Ordering::AcqRel)
    }

    /// Current state, without waiting on the guard.
    ///
    /// While a first construction is in progress in another thread this
    /// reports [`SingletonState::Uninitialized`].
    pub fn state(&self) -> SingletonState {
        if self.is_shut_down() {
            SingletonState::ShutDown
        } else if self.live.load(Ordering::Acquire) {
            SingletonState::Live
        } else {
            SingletonState::Uninitialized
        }
    }

    /// Entity carrying the instance, once one was created or adopted.
    ///
    /// Stays set after shutdown; the reference is never cleared. Takes the
    /// guard, so this waits for an in-progress construction.
    pub fn entity(&self) -> Option<EntityId> {
        self.lock().as_ref().map(|attached| attached.entity)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Attached<T>>> {
        // Only a completed construction is ever stored, so a poisoned guard
        // still holds a consistent value.
        self.instance.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl<T: Behaviour> SingletonSlot<T> {
    /// Returns the instance, discovering or constructing it on first access.
    pub(crate) fn get_or_create<H: Host>(&self, host: &H) -> Result<Access<T>, SingletonError> {
        if self.is_shut_down() {
            return Ok(Access::Rejected);
        }

        let mut guard = self.lock();
        if let Some(attached) = guard.as_ref() {
            return Ok(Access::Existing(Arc::clone(&attached.behaviour)));
        }

        let (attached, adopted) = match host.find_existing::<T>() {
            Some(found) => (found, true),
            None => (Self::construct(host)?, false),
        };

        *guard = Some(attached.clone());
        self.live.store(true, Ordering::Release);

        Ok(if adopted {
            Access::Adopted(attached)
        } else {
            Access::Created(attached)
        })
    }

    fn construct<H: Host>(host: &H) -> Result<Attached<T>, SingletonError> {
        let entity = host
            .create_entity(&behaviour::entity_name::<T>())
            .map_err(SingletonError::construction::<T, _>)?;
        let behaviour = host
            .attach::<T>(entity)
            .map_err(SingletonError::construction::<T, _>)?;
        host.mark_persistent(entity)
            .map_err(SingletonError::construction::<T, _>)?;

        Ok(Attached { entity, behaviour })
    }

    /// Hook that latches this slot when the host reports quit or destruction.
    ///
    /// `on_latch` runs only for the notification that latched the flag.
    pub(crate) fn hook<F>(self: &Arc<Self>, on_latch: F) -> LifecycleHook
    where
        F: Fn(Lifecycle) + Send + Sync + 'static,
    {
        let slot = Arc::clone(self);
        Arc::new(move |cause| {
            if slot.latch() {
                on_latch(cause);
            }
        })
    }
}
