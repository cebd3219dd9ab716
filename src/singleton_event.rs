use crate::{EntityId, Lifecycle};

/// Events emitted by a singleton registry.
///
/// These are passed to the tracing callback set via `set_trace_callback`.
///
/// # Examples
///
/// ```rust
/// use engine_singleton::SingletonEvent;
///
/// let event = SingletonEvent::Rejected { type_name: "Audio" };
/// assert_eq!(event.to_string(), "rejected { type_name: Audio }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingletonEvent {
    /// A new entity was created to carry the instance.
    Created {
        type_name: &'static str,
        entity: EntityId,
    },

    /// An entity already carrying the behaviour was adopted as the instance.
    Adopted {
        type_name: &'static str,
        entity: EntityId,
    },

    /// The instance was handed out to a caller.
    Get { type_name: &'static str },

    /// Access was refused because shutdown had begun.
    Rejected { type_name: &'static str },

    /// The shutdown flag was latched for the first time.
    ShutDown {
        type_name: &'static str,
        cause: Lifecycle,
    },
}

impl std::fmt::Display for SingletonEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SingletonEvent::Created { type_name, entity } => {
                write!(f, "created {{ type_name: {}, entity: {} }}", type_name, entity)
            }
            SingletonEvent::Adopted { type_name, entity } => {
                write!(f, "adopted {{ type_name: {}, entity: {} }}", type_name, entity)
            }
            SingletonEvent::Get { type_name } => write!(f, "get {{ type_name: {} }}", type_name),
            SingletonEvent::Rejected { type_name } => {
                write!(f, "rejected {{ type_name: {} }}", type_name)
            }
            SingletonEvent::ShutDown { type_name, cause } => {
                write!(f, "shut down {{ type_name: {}, cause: {} }}", type_name, cause)
            }
        }
    }
}
