//! Runtime core for an Ecsact integration.
//!
//! Resolves numeric component and action ids to type descriptors, marshals typed values to and
//! from raw fixed-layout memory blocks, and enumerates component id subsets for fallback lookups.
//! See [`ecs`] for the details.

extern crate self as rusty_ecsact;

pub mod ecs;

pub use ecs::{Action, Component};
pub use rusty_ecsact_macros::{Action, Component};

#[doc(hidden)]
pub use inventory;
