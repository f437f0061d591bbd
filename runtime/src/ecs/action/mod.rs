use crate::ecs::{marshal::Marshal, registry::Id};

/// An action type.
///
/// Actions share the marshaling requirements of components but draw their ids from a separate
/// namespace.
pub trait Action: Marshal {
    /// The id this action declares.
    const ID: Id;
}
