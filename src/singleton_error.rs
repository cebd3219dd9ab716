use thiserror::Error;

/// Failures surfaced by `instance`.
///
/// Access after shutdown is not an error: it yields `Ok(None)`.
#[derive(Debug, Error)]
pub enum SingletonError {
    /// A host primitive failed while creating, attaching, persisting or
    /// subscribing the instance.
    #[error("host failed to construct singleton {type_name}")]
    Construction {
        type_name: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The slot stored for a type was not the slot of that type.
    #[error("type mismatch in singleton storage for {type_name}")]
    TypeMismatch { type_name: &'static str },
}

impl SingletonError {
    pub(crate) fn construction<T: ?Sized, E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SingletonError::Construction {
            type_name: std::any::type_name::<T>(),
            source: Box::new(source),
        }
    }

    /// Type name the failure refers to.
    pub fn type_name(&self) -> &'static str {
        match self {
            SingletonError::Construction { type_name, .. } => type_name,
            SingletonError::TypeMismatch { type_name } => type_name,
        }
    }
}
