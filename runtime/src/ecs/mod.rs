pub mod action;
pub mod component;
mod error;
pub mod marshal;
pub mod registry;
pub(crate) mod util;

pub use action::Action;
pub use component::{Component, IdSet, IntoIdSet, Subsets};
pub use error::{Error, Result};
pub use marshal::{Marshal, MarshalBridge, Value};
pub use registry::{Id, Kind, TypeDescriptor, TypeHandle, TypeRegistry};
