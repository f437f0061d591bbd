//! Id to type resolution for components and actions.
//!
//! This module provides [`TypeRegistry`], a thread-safe cache mapping component and action ids
//! to [`TypeDescriptor`]s. Descriptors are discovered lazily: on a cache miss the registry does
//! a linear pass over its [`Catalog`] of loaded types, keeps the first type that declares both
//! the requested capability marker and id, and caches it.
//!
//! # Namespaces
//!
//! Component ids and action ids are independent. The registry keeps one cache per [`Kind`], so
//! component `3` and action `3` may name different types.
//!
//! # Thread Safety
//!
//! Both caches are `DashMap`s. The miss path goes through the entry API, so the check, scan and
//! insert for one id happen under a single shard lock and concurrent resolvers never scan twice
//! for the same id.
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = TypeRegistry::new();
//!
//! let position = registry.resolve_component(Id::new(1)).unwrap();
//! assert_eq!(registry.reverse_resolve(position.handle(), Kind::Component)?, Id::new(1));
//! ```

mod catalog;
mod descriptor;

use std::fmt;

use dashmap::{DashMap, Entry};
use log::{debug, trace};

pub use catalog::{Catalog, Linked, Registration, StaticCatalog};
pub use descriptor::{TypeDescriptor, TypeHandle};

use crate::ecs::{
    Error, Result,
    action::Action,
    component::{Component, IdSet},
};

/// The capability marker a type declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Component data attached to entities.
    Component,
    /// Action data handed to systems.
    Action,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Component => write!(f, "component"),
            Kind::Action => write!(f, "action"),
        }
    }
}

/// A component or action id. Unique within its [`Kind`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(i32);

impl Id {
    /// Construct a new Id from a raw i32 value.
    #[inline]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl From<i32> for Id {
    #[inline]
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A thread-safe registry resolving component and action ids to type descriptors.
pub struct TypeRegistry {
    /// The loaded types scanned on a cache miss.
    catalog: Box<dyn Catalog>,

    /// Resolved component descriptors.
    components: DashMap<Id, TypeDescriptor>,

    /// Resolved action descriptors.
    actions: DashMap<Id, TypeDescriptor>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a registry over every type registered at link time.
    #[inline]
    pub fn new() -> Self {
        Self::with_catalog(Linked)
    }

    /// Create a registry over the given catalog.
    pub fn with_catalog(catalog: impl Catalog + 'static) -> Self {
        Self {
            catalog: Box::new(catalog),
            components: DashMap::new(),
            actions: DashMap::new(),
        }
    }

    #[inline]
    fn cache(&self, kind: Kind) -> &DashMap<Id, TypeDescriptor> {
        match kind {
            Kind::Component => &self.components,
            Kind::Action => &self.actions,
        }
    }

    /// Resolve an id to the descriptor of the type declaring it.
    ///
    /// Returns the cached descriptor if present. Otherwise scans the catalog for a type that
    /// declares the `kind` marker and `id`, caches it and returns it. Returns `None` when no
    /// such type is loaded.
    pub fn resolve(&self, id: Id, kind: Kind) -> Option<TypeDescriptor> {
        let cache = self.cache(kind);

        // Fast path: already resolved
        if let Some(descriptor) = cache.get(&id) {
            trace!("{kind} {id} resolved from cache");
            return Some(*descriptor);
        }

        match cache.entry(id) {
            // Another thread resolved it first
            Entry::Occupied(occupied) => Some(*occupied.get()),
            Entry::Vacant(vacant) => {
                let descriptor = self.scan(id, kind)?;
                vacant.insert(descriptor);
                Some(descriptor)
            }
        }
    }

    /// Resolve a component id. See [`resolve`](Self::resolve).
    #[inline]
    pub fn resolve_component(&self, id: Id) -> Option<TypeDescriptor> {
        self.resolve(id, Kind::Component)
    }

    /// Resolve an action id. See [`resolve`](Self::resolve).
    #[inline]
    pub fn resolve_action(&self, id: Id) -> Option<TypeDescriptor> {
        self.resolve(id, Kind::Action)
    }

    /// Resolve an id, failing with [`Error::NotFound`] if no type declares it.
    #[inline]
    pub fn try_resolve(&self, id: Id, kind: Kind) -> Result<TypeDescriptor> {
        self.resolve(id, kind).ok_or(Error::NotFound { kind, id })
    }

    /// Resolve every component id in a set, in ascending id order.
    ///
    /// Fails on the first id no loaded type declares.
    pub fn resolve_components(&self, ids: &IdSet) -> Result<Vec<TypeDescriptor>> {
        ids.ids()
            .iter()
            .map(|&id| self.try_resolve(id, Kind::Component))
            .collect()
    }

    /// Resolve a type back to the id it declares.
    ///
    /// Components must declare the component marker, or this fails with
    /// [`Error::InvalidType`]. Actions are not checked for their marker; any type declaring an
    /// id is accepted. A type without an id fails with [`Error::MissingIdentifierField`].
    ///
    /// A successfully resolved component is cached as a side effect.
    pub fn reverse_resolve(&self, handle: TypeHandle, kind: Kind) -> Result<Id> {
        let registration = self.catalog.find(&handle);
        let missing_id = Error::MissingIdentifierField {
            kind,
            name: handle.name(),
        };

        match kind {
            Kind::Component => {
                let registration = registration
                    .filter(|r| r.marker() == Some(Kind::Component))
                    .ok_or(Error::InvalidType {
                        kind,
                        name: handle.name(),
                    })?;
                let descriptor = registration.describe(kind).ok_or(missing_id)?;
                self.components.insert(descriptor.id(), descriptor);
                Ok(descriptor.id())
            }
            Kind::Action => registration
                .and_then(|r| r.describe_unchecked(kind))
                .map(|descriptor| descriptor.id())
                .ok_or(missing_id),
        }
    }

    /// Get the id of component `C`.
    ///
    /// If the id is not cached yet and `C` is the catalog's component for it, its descriptor is
    /// cached. An unloaded `C` never displaces the loaded type declaring the same id.
    pub fn component_id<C: Component>(&self) -> Id {
        if let Entry::Vacant(vacant) = self.components.entry(C::ID) {
            let descriptor = self
                .catalog
                .find(&TypeHandle::of::<C>())
                .and_then(|r| r.describe(Kind::Component))
                .filter(|d| d.id() == C::ID);
            if let Some(descriptor) = descriptor {
                vacant.insert(descriptor);
            }
        }
        C::ID
    }

    /// Get the id of action `A`.
    #[inline]
    pub fn action_id<A: Action>(&self) -> Id {
        A::ID
    }

    /// Drop every cached descriptor.
    ///
    /// Descriptors already handed out stay valid; later resolutions scan the catalog again.
    pub fn clear_cache(&self) {
        trace!(
            "clearing {} component and {} action descriptors",
            self.components.len(),
            self.actions.len()
        );
        self.components.clear();
        self.actions.clear();
    }

    /// Get the number of cached descriptors across both kinds.
    #[inline]
    pub fn len(&self) -> usize {
        self.components.len() + self.actions.len()
    }

    /// Check if nothing is cached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Linear pass over the catalog for the first type declaring `kind` and `id`.
    fn scan(&self, id: Id, kind: Kind) -> Option<TypeDescriptor> {
        let mut scanned = 0usize;
        let found = self
            .catalog
            .registrations()
            .inspect(|_| scanned += 1)
            .find_map(|r| r.describe(kind).filter(|d| d.id() == id));

        debug!(
            "scanned {scanned} registrations for {kind} {id}: {}",
            match &found {
                Some(descriptor) => descriptor.name(),
                None => "not found",
            }
        );
        found
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        thread,
    };

    use bytemuck::{Pod, Zeroable};

    use super::*;

    #[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Position {
        x: f32,
        y: f32,
    }

    impl Component for Position {
        const ID: Id = Id::new(1);
    }

    #[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }

    impl Component for Velocity {
        const ID: Id = Id::new(2);
    }

    #[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Jump {
        height: f32,
    }

    impl Action for Jump {
        const ID: Id = Id::new(1);
    }

    #[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Unmarked {
        value: u32,
    }

    #[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Nameless {
        value: u32,
    }

    /// Catalog wrapper counting how many scans hit it.
    #[derive(Clone)]
    struct Counting {
        inner: StaticCatalog,
        scans: Arc<AtomicUsize>,
    }

    impl Catalog for Counting {
        fn registrations(&self) -> Box<dyn Iterator<Item = &Registration> + '_> {
            self.scans.fetch_add(1, Ordering::Relaxed);
            self.inner.registrations()
        }
    }

    fn catalog() -> StaticCatalog {
        StaticCatalog::new()
            .with(Registration::component::<Position>())
            .with(Registration::component::<Velocity>())
            .with(Registration::action::<Jump>())
            .with(Registration::plain::<Unmarked>().with_id(Id::new(40)))
            .with(Registration::plain::<Nameless>().with_marker(Kind::Component))
    }

    fn counted() -> (TypeRegistry, Arc<AtomicUsize>) {
        let scans = Arc::new(AtomicUsize::new(0));
        let registry = TypeRegistry::with_catalog(Counting {
            inner: catalog(),
            scans: Arc::clone(&scans),
        });
        (registry, scans)
    }

    // ==================== Resolution ====================

    #[test]
    fn resolve_component() {
        // Given
        let registry = TypeRegistry::with_catalog(catalog());

        // When
        let descriptor = registry.resolve_component(Id::new(2)).unwrap();

        // Then
        assert_eq!(descriptor.id(), Id::new(2));
        assert_eq!(descriptor.kind(), Kind::Component);
        assert_eq!(descriptor.handle(), TypeHandle::of::<Velocity>());
        assert_eq!(descriptor.size(), std::mem::size_of::<Velocity>());
    }

    #[test]
    fn component_and_action_ids_are_separate_namespaces() {
        // Given
        let registry = TypeRegistry::with_catalog(catalog());

        // When
        let component = registry.resolve_component(Id::new(1)).unwrap();
        let action = registry.resolve_action(Id::new(1)).unwrap();

        // Then
        assert_eq!(component.handle(), TypeHandle::of::<Position>());
        assert_eq!(action.handle(), TypeHandle::of::<Jump>());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn resolve_unknown_id_is_none() {
        // Given
        let registry = TypeRegistry::with_catalog(catalog());

        // Then
        assert!(registry.resolve_component(Id::new(99)).is_none());
        assert!(registry.is_empty());
        assert_eq!(
            registry.try_resolve(Id::new(99), Kind::Action),
            Err(Error::NotFound {
                kind: Kind::Action,
                id: Id::new(99)
            })
        );
    }

    #[test]
    fn resolve_ignores_types_without_the_marker() {
        // Given - Unmarked declares id 40 but no capability marker
        let registry = TypeRegistry::with_catalog(catalog());

        // Then
        assert!(registry.resolve_component(Id::new(40)).is_none());
        assert!(registry.resolve_action(Id::new(40)).is_none());
    }

    #[test]
    fn resolve_is_cached() {
        // Given
        let (registry, scans) = counted();

        // When
        let first = registry.resolve_component(Id::new(1)).unwrap();
        let second = registry.resolve_component(Id::new(1)).unwrap();

        // Then
        assert_eq!(first, second);
        assert_eq!(scans.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn misses_are_not_cached() {
        // Given
        let (registry, scans) = counted();

        // When
        registry.resolve_component(Id::new(99));
        registry.resolve_component(Id::new(99));

        // Then
        assert_eq!(scans.load(Ordering::Relaxed), 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn clear_cache_forces_rediscovery() {
        // Given
        let (registry, scans) = counted();
        let held = registry.resolve_component(Id::new(2)).unwrap();

        // When
        registry.clear_cache();

        // Then
        assert!(registry.is_empty());
        let again = registry.resolve_component(Id::new(2)).unwrap();
        assert_eq!(scans.load(Ordering::Relaxed), 2);
        assert_eq!(held, again);
        assert_eq!(held.handle(), TypeHandle::of::<Velocity>());
    }

    #[test]
    fn resolve_components_in_set() {
        // Given
        let registry = TypeRegistry::with_catalog(catalog());

        // When
        let resolved = registry
            .resolve_components(&IdSet::new([Id::new(2), Id::new(1)]))
            .unwrap();
        let missing = registry.resolve_components(&IdSet::new([Id::new(1), Id::new(7)]));

        // Then
        assert_eq!(resolved[0].handle(), TypeHandle::of::<Position>());
        assert_eq!(resolved[1].handle(), TypeHandle::of::<Velocity>());
        assert_eq!(
            missing,
            Err(Error::NotFound {
                kind: Kind::Component,
                id: Id::new(7)
            })
        );
    }

    // ==================== Reverse Resolution ====================

    #[test]
    fn reverse_resolve_round_trip() {
        // Given
        let registry = TypeRegistry::with_catalog(catalog());

        for (id, kind) in [
            (Id::new(1), Kind::Component),
            (Id::new(2), Kind::Component),
            (Id::new(1), Kind::Action),
        ] {
            // When
            let descriptor = registry.resolve(id, kind).unwrap();

            // Then
            assert_eq!(registry.reverse_resolve(descriptor.handle(), kind), Ok(id));
        }
    }

    #[test]
    fn reverse_resolve_component_caches_descriptor() {
        // Given
        let (registry, scans) = counted();

        // When
        registry
            .reverse_resolve(TypeHandle::of::<Velocity>(), Kind::Component)
            .unwrap();
        let before = scans.load(Ordering::Relaxed);
        registry.resolve_component(Id::new(2)).unwrap();

        // Then
        assert_eq!(scans.load(Ordering::Relaxed), before);
    }

    #[test]
    fn reverse_resolve_component_requires_marker() {
        // Given
        let registry = TypeRegistry::with_catalog(catalog());

        // When
        let unmarked = registry.reverse_resolve(TypeHandle::of::<Unmarked>(), Kind::Component);
        let unknown = registry.reverse_resolve(TypeHandle::of::<u64>(), Kind::Component);
        let action = registry.reverse_resolve(TypeHandle::of::<Jump>(), Kind::Component);

        // Then
        assert!(matches!(unmarked, Err(Error::InvalidType { .. })));
        assert!(matches!(unknown, Err(Error::InvalidType { .. })));
        assert!(matches!(action, Err(Error::InvalidType { .. })));
    }

    #[test]
    fn reverse_resolve_component_requires_id() {
        // Given
        let registry = TypeRegistry::with_catalog(catalog());

        // When
        let result = registry.reverse_resolve(TypeHandle::of::<Nameless>(), Kind::Component);

        // Then
        assert_eq!(
            result,
            Err(Error::MissingIdentifierField {
                kind: Kind::Component,
                name: std::any::type_name::<Nameless>(),
            })
        );
    }

    #[test]
    fn reverse_resolve_action_skips_marker_check() {
        // Given
        let registry = TypeRegistry::with_catalog(catalog());

        // When - Unmarked declares an id but is not an action
        let unmarked = registry.reverse_resolve(TypeHandle::of::<Unmarked>(), Kind::Action);
        let nameless = registry.reverse_resolve(TypeHandle::of::<Nameless>(), Kind::Action);

        // Then
        assert_eq!(unmarked, Ok(Id::new(40)));
        assert!(matches!(
            nameless,
            Err(Error::MissingIdentifierField {
                kind: Kind::Action,
                ..
            })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn typed_ids() {
        // Given
        let (registry, scans) = counted();

        // When
        let position = registry.component_id::<Position>();
        let jump = registry.action_id::<Jump>();

        // Then
        assert_eq!(position, Id::new(1));
        assert_eq!(jump, Id::new(1));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.resolve_component(position).map(|d| d.handle()),
            Some(TypeHandle::of::<Position>())
        );
        // One catalog lookup for `component_id`, none for the cached resolve
        assert_eq!(scans.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn component_id_of_unloaded_type_keeps_loaded_type() {
        // Given - a type the catalog does not know, sharing Velocity's id
        #[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
        #[repr(C)]
        struct Impostor {
            value: u64,
        }

        impl Component for Impostor {
            const ID: Id = Id::new(2);
        }

        let registry = TypeRegistry::with_catalog(catalog());

        // When
        let id = registry.component_id::<Impostor>();

        // Then
        assert_eq!(id, Id::new(2));
        assert!(registry.is_empty());
        assert_eq!(
            registry.resolve_component(id).map(|d| d.handle()),
            Some(TypeHandle::of::<Velocity>())
        );
        assert_eq!(registry.component_id::<Impostor>(), Id::new(2));
        assert_eq!(
            registry.resolve_component(id).map(|d| d.handle()),
            Some(TypeHandle::of::<Velocity>())
        );
    }

    // ==================== Concurrent Resolution ====================

    #[test]
    fn concurrent_resolution_scans_once_per_id() {
        // Given
        let (registry, scans) = counted();
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let id = if i % 2 == 0 { Id::new(1) } else { Id::new(2) };
                    registry.resolve_component(id)
                })
            })
            .collect();

        // When
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Then
        assert!(results.iter().all(Option::is_some));
        assert!(results.iter().step_by(2).all(|r| *r == results[0]));
        assert!(results.iter().skip(1).step_by(2).all(|r| *r == results[1]));
        assert_eq!(scans.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn concurrent_clear_and_resolve() {
        // Given
        let registry = Arc::new(TypeRegistry::with_catalog(catalog()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..100 {
                        if i == 0 {
                            registry.clear_cache();
                        } else {
                            assert!(registry.resolve_component(Id::new(2)).is_some());
                        }
                    }
                })
            })
            .collect();

        // Then
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
