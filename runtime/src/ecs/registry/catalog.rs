//! The catalog of loaded types the registry scans on a cache miss.
//!
//! Every `#[derive(Component)]` or `#[derive(Action)]` submits a [`Registration`] at link time,
//! and the [`Linked`] catalog iterates them. [`StaticCatalog`] holds an explicit list instead,
//! which keeps a registry isolated from whatever else happens to be linked into the binary.

use crate::ecs::{
    action::Action,
    component::Component,
    marshal::Marshal,
    registry::{Id, Kind, TypeDescriptor, TypeHandle, descriptor::Shape},
};

/// One loaded type, as seen by the registry.
///
/// Derived components and actions always declare a capability marker and an id. Plain
/// registrations start with neither; a type without them can still be looked up, it just
/// cannot be resolved.
#[derive(Clone, Copy)]
pub struct Registration {
    marker: Option<Kind>,
    id: Option<Id>,
    shape: Shape,
}

inventory::collect!(Registration);

impl Registration {
    /// Registration for a component type.
    pub const fn component<C: Component>() -> Self {
        Self {
            marker: Some(Kind::Component),
            id: Some(C::ID),
            shape: Shape::of::<C>(),
        }
    }

    /// Registration for an action type.
    pub const fn action<A: Action>() -> Self {
        Self {
            marker: Some(Kind::Action),
            id: Some(A::ID),
            shape: Shape::of::<A>(),
        }
    }

    /// Registration for a type with neither a capability marker nor an id.
    pub const fn plain<T: Marshal>() -> Self {
        Self {
            marker: None,
            id: None,
            shape: Shape::of::<T>(),
        }
    }

    /// Declare the capability marker.
    pub const fn with_marker(mut self, kind: Kind) -> Self {
        self.marker = Some(kind);
        self
    }

    /// Declare the static id.
    pub const fn with_id(mut self, id: Id) -> Self {
        self.id = Some(id);
        self
    }

    /// The capability marker this type declares, if any.
    #[inline]
    pub fn marker(&self) -> Option<Kind> {
        self.marker
    }

    /// The static id this type declares, if any.
    #[inline]
    pub fn id(&self) -> Option<Id> {
        self.id
    }

    /// The handle of the registered type.
    #[inline]
    pub fn handle(&self) -> TypeHandle {
        self.shape.handle()
    }

    /// Build a descriptor if this type declares both the `kind` marker and an id.
    pub(crate) fn describe(&self, kind: Kind) -> Option<TypeDescriptor> {
        if self.marker != Some(kind) {
            return None;
        }
        self.id.map(|id| TypeDescriptor::new(id, kind, self.shape))
    }

    /// Build a descriptor from the declared id alone, ignoring the marker.
    pub(crate) fn describe_unchecked(&self, kind: Kind) -> Option<TypeDescriptor> {
        self.id.map(|id| TypeDescriptor::new(id, kind, self.shape))
    }
}

/// The universe of loaded types.
pub trait Catalog: Send + Sync {
    /// Every registration in the catalog, in no particular order.
    fn registrations(&self) -> Box<dyn Iterator<Item = &Registration> + '_>;

    /// Find the registration for a type handle.
    fn find(&self, handle: &TypeHandle) -> Option<&Registration> {
        self.registrations().find(|r| r.handle() == *handle)
    }
}

/// Catalog of every registration submitted at link time.
#[derive(Debug, Default, Clone, Copy)]
pub struct Linked;

impl Catalog for Linked {
    fn registrations(&self) -> Box<dyn Iterator<Item = &Registration> + '_> {
        Box::new(
            inventory::iter::<Registration>
                .into_iter()
                .map(|registration| registration as &Registration),
        )
    }
}

/// Catalog over an explicit list of registrations.
#[derive(Default, Clone)]
pub struct StaticCatalog {
    registrations: Vec<Registration>,
}

impl StaticCatalog {
    /// Create an empty catalog.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a registration, builder style.
    #[inline]
    pub fn with(mut self, registration: Registration) -> Self {
        self.push(registration);
        self
    }

    /// Add a registration.
    #[inline]
    pub fn push(&mut self, registration: Registration) {
        self.registrations.push(registration);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl From<Vec<Registration>> for StaticCatalog {
    fn from(registrations: Vec<Registration>) -> Self {
        Self { registrations }
    }
}

impl Catalog for StaticCatalog {
    fn registrations(&self) -> Box<dyn Iterator<Item = &Registration> + '_> {
        Box::new(self.registrations.iter())
    }
}
