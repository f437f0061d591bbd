use crate::ecs::registry::{Id, Kind};

/// Convenience result type for the ECS runtime.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the registry and the marshal bridge.
///
/// Nothing in this crate logs or swallows these; they always reach the immediate caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No registered type declares the given id for the kind.
    #[error("no {kind} registered with id {id}")]
    NotFound { kind: Kind, id: Id },

    /// The type does not declare the capability marker for the kind.
    #[error("type '{name}' is not a {kind}")]
    InvalidType { kind: Kind, name: &'static str },

    /// The type does not declare a static id.
    #[error("type '{name}' does not declare a static {kind} id")]
    MissingIdentifierField { kind: Kind, name: &'static str },

    /// The memory block cannot hold a value of the type.
    #[error("memory block of {actual} bytes is too small for '{name}' ({required} bytes)")]
    BlockTooSmall {
        name: &'static str,
        required: usize,
        actual: usize,
    },

    /// The value handed to the bridge is not of the type the descriptor describes.
    #[error("value is not a '{expected}'")]
    TypeMismatch { expected: &'static str },

    /// A raw write was handed the null address.
    #[error("cannot write '{name}' to a null address")]
    NullAddress { name: &'static str },
}
