//! Unified error type exposed by **`artificial-core`**.
//!
//! Both schema producers (the build-time injector and the runtime fallback)
//! report failures through [`ArtificialError`], so a caller of the model-call
//! wrapper sees the same message regardless of which phase tripped.

use thiserror::Error;

/// Convenient alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ArtificialError>;

#[derive(Debug, Error)]
pub enum ArtificialError {
    /// A type shape outside the supported algebra was reached during
    /// synthesis. `ty` is the display form of the offending type.
    #[error("schema generation is not supported for type `{ty}`")]
    UnsupportedType { ty: String },

    /// A named type reached the runtime generator without an attached
    /// schema. Structural reflection of user types is not available at
    /// runtime, so the static phase must have annotated it.
    #[error("runtime schema generation is not yet supported for type: {ty}")]
    MissingSchemaMapping { ty: String },

    /// The named type `name` refers back to itself.
    #[error("type `{name}` is self-referential and cannot be expanded into a schema")]
    RecursiveType { name: String },

    /// The host build already carries `errors` diagnostics. The injector
    /// returns this without touching any source.
    #[error("schema injection skipped: build has {errors} error(s)")]
    AnalysisAborted { errors: usize },

    /// A raw schema node could not be interpreted by the sanitizer.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Failure while serialising or deserialising schema JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ArtificialError {
    pub(crate) fn unsupported(ty: impl ToString) -> Self {
        ArtificialError::UnsupportedType { ty: ty.to_string() }
    }
}
