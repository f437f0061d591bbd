//! Component types and component id sets.
//!
//! - [`Component`]: the trait every component type implements, usually through
//!   `#[derive(Component)]`
//! - [`IdSet`]: an ascending, duplicate free set of component ids, used as a lookup key for
//!   component combinations
//! - [`Subsets`]: the most-to-least specific enumeration of an [`IdSet`]'s subsets, used to
//!   relax a lookup one component at a time
//!
//! ## Usage
//!
//! ```ignore
//! use bytemuck::{Pod, Zeroable};
//! use rusty_ecsact::Component;
//!
//! #[derive(Clone, Copy, Default, Pod, Zeroable, Component)]
//! #[repr(C)]
//! #[component(id = 1)]
//! struct Position { x: f32, y: f32 }
//! ```

mod set;
mod subsets;

pub use set::{IdSet, IntoIdSet};
pub use subsets::Subsets;

use crate::ecs::{marshal::Marshal, registry::Id};

/// A component type.
///
/// Components are plain old data so they can be copied in and out of raw memory blocks. The id
/// is unique among components but may collide with an action id.
pub trait Component: Marshal {
    /// The id this component declares.
    const ID: Id;
}
