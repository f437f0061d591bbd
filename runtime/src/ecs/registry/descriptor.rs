use std::{
    alloc::Layout,
    any::{Any, TypeId as StdTypeId},
    fmt,
    hash::{Hash, Hasher},
    mem::MaybeUninit,
};

use crate::ecs::{
    marshal::{Marshal, Value},
    registry::{Id, Kind},
};

/// An opaque reference to a Rust type.
///
/// Two handles are equal when they refer to the same type. The name is carried along for
/// diagnostics only.
#[derive(Debug, Clone, Copy)]
pub struct TypeHandle {
    type_id: StdTypeId,
    name: &'static str,
}

impl TypeHandle {
    /// Get the handle for type `T`.
    #[inline]
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: StdTypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Get the Rust TypeId.
    #[inline]
    pub fn type_id(&self) -> StdTypeId {
        self.type_id
    }

    /// Get the type name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeHandle {}

impl Hash for TypeHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Type-erased marshal functions for a single type.
///
/// Built in const context so it can live inside link-time registrations, which is why the type
/// identity is captured as function pointers rather than values.
#[derive(Clone, Copy)]
pub(crate) struct Shape {
    layout: Layout,
    type_id: fn() -> StdTypeId,
    type_name: fn() -> &'static str,
    default_fn: fn() -> Value,
    read_fn: unsafe fn(*const u8) -> Value,
    write_fn: fn(&dyn Any, &mut [MaybeUninit<u8>]) -> bool,
}

impl Shape {
    /// Construct the shape of type `T`.
    pub(crate) const fn of<T: Marshal>() -> Self {
        Self {
            layout: Layout::new::<T>(),
            type_id: StdTypeId::of::<T>,
            type_name: std::any::type_name::<T>,
            default_fn: Self::default_impl::<T>,
            read_fn: Self::read_impl::<T>,
            write_fn: Self::write_impl::<T>,
        }
    }

    #[inline]
    pub(crate) fn layout(&self) -> Layout {
        self.layout
    }

    #[inline]
    pub(crate) fn handle(&self) -> TypeHandle {
        TypeHandle {
            type_id: (self.type_id)(),
            name: (self.type_name)(),
        }
    }

    #[inline]
    pub(crate) fn default_value(&self) -> Value {
        (self.default_fn)()
    }

    /// Materialize a value from the `layout().size()` bytes at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `layout().size()` bytes whose non-padding bytes are
    /// initialized. No alignment is required.
    #[inline]
    pub(crate) unsafe fn read(&self, ptr: *const u8) -> Value {
        unsafe { (self.read_fn)(ptr) }
    }

    /// Copy `value` into the leading `layout().size()` bytes of `bytes`.
    ///
    /// Returns false, leaving `bytes` untouched, if `value` is not of this shape's type or
    /// `bytes` is too short.
    #[inline]
    pub(crate) fn write(&self, value: &dyn Any, bytes: &mut [MaybeUninit<u8>]) -> bool {
        (self.write_fn)(value, bytes)
    }

    fn default_impl<T: Marshal>() -> Value {
        Box::new(T::default())
    }

    unsafe fn read_impl<T: Marshal>(ptr: *const u8) -> Value {
        // SAFETY: `T: AnyBitPattern`, so any initialized field bytes form a valid `T`.
        Box::new(unsafe { ptr.cast::<T>().read_unaligned() })
    }

    fn write_impl<T: Marshal>(value: &dyn Any, bytes: &mut [MaybeUninit<u8>]) -> bool {
        match value.downcast_ref::<T>() {
            Some(value) if bytes.len() >= std::mem::size_of::<T>() => {
                // SAFETY: the span holds at least `size_of::<T>()` writable bytes.
                unsafe { bytes.as_mut_ptr().cast::<T>().write_unaligned(*value) };
                true
            }
            _ => false,
        }
    }
}

/// The resolved binding of an id to a type's in-memory layout.
///
/// Descriptors are plain values: holding one is unaffected by later changes to the registry
/// cache.
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    id: Id,
    kind: Kind,
    handle: TypeHandle,
    shape: Shape,
}

impl TypeDescriptor {
    pub(crate) fn new(id: Id, kind: Kind, shape: Shape) -> Self {
        Self {
            id,
            kind,
            handle: shape.handle(),
            shape,
        }
    }

    /// Get the id.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the kind of type (component or action).
    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Get the handle of the described type.
    #[inline]
    pub fn handle(&self) -> TypeHandle {
        self.handle
    }

    /// Get the type name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.handle.name()
    }

    /// Get the memory layout.
    #[inline]
    pub fn layout(&self) -> Layout {
        self.shape.layout()
    }

    /// Get the fixed size in bytes of the in-memory representation.
    #[inline]
    pub fn size(&self) -> usize {
        self.shape.layout().size()
    }

    #[inline]
    pub(crate) fn shape(&self) -> &Shape {
        &self.shape
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.kind == other.kind && self.handle == other.handle
    }
}

impl Eq for TypeDescriptor {}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("name", &self.handle.name())
            .field("size", &self.size())
            .finish()
    }
}
