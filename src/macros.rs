//! Macros for creating singleton registries.

/// Creates a complete singleton registry with a single macro invocation.
///
/// The macro generates a module containing:
/// - Host, slot storage and trace callback statics (hidden)
/// - An `Api` type that implements `SingletonApi`, and the `API` constant
/// - Free functions delegating to `API`
///
/// With one argument the registry is backed by a fresh [`World`](crate::World).
/// Pass a host type and an initialiser expression to bind another host. The
/// generated module glob-imports its parent, so invoke the macro at module level
/// when the host type is a local name.
///
/// # Examples
///
/// ```rust
/// use engine_singleton::{define_singletons, Behaviour};
/// use std::sync::Arc;
///
/// define_singletons!(game);
///
/// #[derive(Default)]
/// struct Scoreboard;
/// impl Behaviour for Scoreboard {}
///
/// let a: Arc<Scoreboard> = game::instance().unwrap().unwrap();
/// let b: Arc<Scoreboard> = game::instance().unwrap().unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
///
/// game::on_application_quit::<Scoreboard>();
/// assert!(game::instance::<Scoreboard>().unwrap().is_none());
/// ```
///
/// # Multiple Registries
///
/// Each registry has its own host and slots:
///
/// ```rust
/// use engine_singleton::{define_singletons, Behaviour};
///
/// define_singletons!(menu);
/// define_singletons!(level);
///
/// #[derive(Default)]
/// struct Camera;
/// impl Behaviour for Camera {}
///
/// menu::instance::<Camera>().unwrap();
/// menu::on_application_quit::<Camera>();
///
/// // Shutting down one registry does not affect the other.
/// assert!(level::instance::<Camera>().unwrap().is_some());
/// ```
#[macro_export]
macro_rules! define_singletons {
    ($name:ident) => {
        $crate::define_singletons!($name, $crate::World, $crate::World::new());
    };
    ($name:ident, $host:ty, $init:expr) => {
        pub mod $name {
            #[allow(unused_imports)]
            use super::*;

            use std::collections::HashMap;
            use std::sync::{Arc, LazyLock, Mutex};

            // Host the registry creates and discovers instances through (module-private)
            static HOST: LazyLock<$host> = LazyLock::new(|| $init);

            // Per-type slots (module-private)
            static SLOTS: $crate::SlotStorage = LazyLock::new(|| Mutex::new(HashMap::new()));

            // Trace callback storage (module-private)
            static TRACE: $crate::TraceCallback = LazyLock::new(|| Mutex::new(None));

            /// Zero-sized type that implements the registry API.
            #[derive(Debug, Clone, Copy, Default)]
            pub struct Api;

            impl $crate::SingletonApi for Api {
                type Host = $host;

                fn host() -> &'static $host {
                    &HOST
                }

                fn slots() -> &'static $crate::SlotStorage {
                    &SLOTS
                }

                fn trace() -> &'static $crate::TraceCallback {
                    &TRACE
                }
            }

            /// Convenient constant for accessing the registry API.
            pub const API: Api = Api;

            /// The host backing this registry.
            pub fn host() -> &'static $host {
                &HOST
            }

            /// Return the live instance of `T`, creating it on first access.
            pub fn instance<T: $crate::Behaviour>() -> Result<Option<Arc<T>>, $crate::SingletonError> {
                use $crate::SingletonApi;
                API.instance()
            }

            /// Current state of `T`.
            pub fn state<T: $crate::Behaviour>() -> $crate::SingletonState {
                use $crate::SingletonApi;
                API.state::<T>()
            }

            /// Whether shutdown has begun for `T`.
            pub fn is_shut_down<T: $crate::Behaviour>() -> bool {
                use $crate::SingletonApi;
                API.is_shut_down::<T>()
            }

            /// Latch shutdown for `T`: the application is quitting.
            pub fn on_application_quit<T: $crate::Behaviour>() {
                use $crate::SingletonApi;
                API.on_application_quit::<T>()
            }

            /// Latch shutdown for `T`: its entity is being destroyed.
            pub fn on_destroy<T: $crate::Behaviour>() {
                use $crate::SingletonApi;
                API.on_destroy::<T>()
            }

            /// Set a tracing callback for registry operations.
            pub fn set_trace_callback(callback: impl Fn(&$crate::SingletonEvent) + Send + Sync + 'static) {
                use $crate::SingletonApi;
                API.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                use $crate::SingletonApi;
                API.clear_trace_callback()
            }
        }
    };
}
