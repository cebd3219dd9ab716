//! # Engine Singleton
//!
//! Lazily created, shutdown-aware singletons for engine-managed behaviours.
//!
//! Any type implementing [`Behaviour`] gets one process-wide instance per registry:
//! created on first access (or adopted, if the host already has an entity carrying
//! it), kept alive across scene transitions, and never handed out again once the
//! application has begun quitting or the instance's entity was destroyed.
//!
//! ## Quick Start
//!
//! ```rust
//! use engine_singleton::{define_singletons, Behaviour, Singleton};
//! use std::sync::Arc;
//!
//! define_singletons!(app);
//!
//! #[derive(Default)]
//! struct Settings;
//!
//! impl Behaviour for Settings {}
//!
//! impl Singleton for Settings {
//!     type Registry = app::Api;
//! }
//!
//! let settings: Arc<Settings> = Settings::instance().unwrap().unwrap();
//!
//! // The host delivers the quit notification; late access yields `None`.
//! app::host().quit();
//! assert!(Settings::instance().unwrap().is_none());
//! # drop(settings);
//! ```
//!
//! ## Main Items
//!
//! - [`define_singletons!`] - Define an isolated registry bound to a host
//! - [`SingletonApi`] - Registry operations (`instance`, shutdown hooks, tracing)
//! - [`Singleton`] - `T::instance()` for a concrete behaviour
//! - [`Host`] - The engine collaborator; [`World`] is the in-process reference host

mod behaviour;
mod host;
mod macros;
mod singleton_error;
mod singleton_event;
mod singleton_slot;
mod singleton_trait;
mod world;

pub use behaviour::{entity_name, Behaviour, Singleton, SINGLETON_SUFFIX};
pub use host::{Attached, EntityId, Host, Lifecycle, LifecycleHook};
pub use singleton_error::SingletonError;
pub use singleton_event::SingletonEvent;
pub use singleton_slot::{SingletonSlot, SingletonState};
pub use singleton_trait::{SingletonApi, SlotStorage, TraceCallback};
pub use world::{World, WorldError};
