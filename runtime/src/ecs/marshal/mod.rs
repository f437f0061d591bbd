//! Copying typed values in and out of raw fixed-layout memory blocks.
//!
//! A memory block is a byte span holding the `#[repr(C)]` representation of exactly one value.
//! `None` stands in for the null address: reading from it produces a default-constructed value
//! without touching memory.
//!
//! # Layout
//!
//! Marshalable types are `#[repr(C)]` types for which every initialized bit pattern is valid
//! ([`bytemuck::AnyBitPattern`]). Padding is allowed and follows the platform's default
//! alignment rules. Reads and writes are unaligned, so blocks need no particular alignment.
//!
//! Because a written value may carry padding, writes target `MaybeUninit<u8>` spans: the
//! padding bytes of a block are unspecified after a write. Blocks of plain initialized bytes
//! (such as ones filled by a native runtime) are read with [`read`]; blocks filled by [`write`]
//! are read back with [`read_uninit`].
//!
//! # Safety Contract
//!
//! The span functions check the block size and the runtime type of the value and report
//! violations as errors. The raw pointer functions ([`read_raw`], [`write_raw`]) exist for
//! native boundaries that only hand over an address; they check for null but trust the caller
//! for the block size.
//!
//! No locking happens here. Disjoint blocks may be used from any number of threads; the same
//! block must not be read and written concurrently.

use std::{any::Any, mem::MaybeUninit};

use bytemuck::AnyBitPattern;

use crate::ecs::{
    Error, Result,
    registry::{Id, Kind, TypeDescriptor, TypeRegistry},
};

/// A materialized value of a type only known through its descriptor.
pub type Value = Box<dyn Any + Send>;

/// Types that can be copied to and from raw memory blocks.
pub trait Marshal: AnyBitPattern + Default + Send + Sync + 'static {}

impl<T: AnyBitPattern + Default + Send + Sync + 'static> Marshal for T {}

/// Fail unless `block` can hold `size` bytes of `name`.
#[inline]
fn check_block(name: &'static str, size: usize, block: usize) -> Result<()> {
    if block < size {
        return Err(Error::BlockTooSmall {
            name,
            required: size,
            actual: block,
        });
    }
    Ok(())
}

/// Materialize a value of the described type from a block of initialized bytes.
///
/// `None` produces the type's default value. Otherwise the leading `descriptor.size()` bytes
/// are read; anything past them is ignored.
pub fn read(descriptor: &TypeDescriptor, block: Option<&[u8]>) -> Result<Value> {
    let Some(bytes) = block else {
        return Ok(descriptor.shape().default_value());
    };
    check_block(descriptor.name(), descriptor.size(), bytes.len())?;
    // SAFETY: the span holds `size` initialized bytes and every bit pattern is valid.
    Ok(unsafe { descriptor.shape().read(bytes.as_ptr()) })
}

/// Materialize a value of the described type from a block previously filled by [`write`].
///
/// `None` produces the type's default value.
///
/// # Safety
///
/// Every non-padding byte of the leading `descriptor.size()` bytes must be initialized, which
/// holds for a block written by [`write`] or [`write_raw`] with the same descriptor.
pub unsafe fn read_uninit(
    descriptor: &TypeDescriptor,
    block: Option<&[MaybeUninit<u8>]>,
) -> Result<Value> {
    let Some(bytes) = block else {
        return Ok(descriptor.shape().default_value());
    };
    check_block(descriptor.name(), descriptor.size(), bytes.len())?;
    Ok(unsafe { descriptor.shape().read(bytes.as_ptr().cast()) })
}

/// Copy `value` into the leading `descriptor.size()` bytes of `block`.
///
/// Bytes past the value's size are left as they were.
pub fn write(
    descriptor: &TypeDescriptor,
    value: &dyn Any,
    block: &mut [MaybeUninit<u8>],
) -> Result<()> {
    check_block(descriptor.name(), descriptor.size(), block.len())?;
    if descriptor.shape().write(value, block) {
        Ok(())
    } else {
        Err(Error::TypeMismatch {
            expected: descriptor.name(),
        })
    }
}

/// Materialize a value of the described type from a raw address.
///
/// A null `ptr` produces the type's default value.
///
/// # Safety
///
/// A non-null `ptr` must be valid for reads of `descriptor.size()` bytes whose non-padding
/// bytes are initialized.
pub unsafe fn read_raw(descriptor: &TypeDescriptor, ptr: *const u8) -> Value {
    if ptr.is_null() {
        return descriptor.shape().default_value();
    }
    unsafe { descriptor.shape().read(ptr) }
}

/// Copy `value` to a raw address.
///
/// A null `ptr` fails with [`Error::NullAddress`].
///
/// # Safety
///
/// A non-null `ptr` must be valid for writes of `descriptor.size()` bytes, and nothing else may
/// access those bytes for the duration of the call.
pub unsafe fn write_raw(descriptor: &TypeDescriptor, value: &dyn Any, ptr: *mut u8) -> Result<()> {
    if ptr.is_null() {
        return Err(Error::NullAddress {
            name: descriptor.name(),
        });
    }
    let bytes = unsafe {
        std::slice::from_raw_parts_mut(ptr.cast::<MaybeUninit<u8>>(), descriptor.size())
    };
    write(descriptor, value, bytes)
}

/// Typed form of [`read`].
pub fn read_value<T: Marshal>(block: Option<&[u8]>) -> Result<T> {
    let size = std::mem::size_of::<T>();
    match block {
        None => Ok(T::default()),
        Some(bytes) => {
            check_block(std::any::type_name::<T>(), size, bytes.len())?;
            Ok(bytemuck::pod_read_unaligned(&bytes[..size]))
        }
    }
}

/// Typed form of [`write`].
pub fn write_value<T: Marshal>(value: &T, block: &mut [MaybeUninit<u8>]) -> Result<()> {
    let size = std::mem::size_of::<T>();
    check_block(std::any::type_name::<T>(), size, block.len())?;
    // SAFETY: the block holds at least `size` bytes; the write is unaligned.
    unsafe { block.as_mut_ptr().cast::<T>().write_unaligned(*value) };
    Ok(())
}

/// Marshals values by component or action id, resolving descriptors through a registry.
#[derive(Clone, Copy)]
pub struct MarshalBridge<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> MarshalBridge<'r> {
    /// Create a bridge resolving through `registry`.
    #[inline]
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Get the registry this bridge resolves through.
    #[inline]
    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// Read a component value; `None` produces the default value.
    #[inline]
    pub fn read_component(&self, id: Id, block: Option<&[u8]>) -> Result<Value> {
        read(&self.registry.try_resolve(id, Kind::Component)?, block)
    }

    /// Read a component value from a block filled by [`write_component`](Self::write_component).
    ///
    /// # Safety
    ///
    /// See [`read_uninit`].
    #[inline]
    pub unsafe fn read_component_uninit(
        &self,
        id: Id,
        block: Option<&[MaybeUninit<u8>]>,
    ) -> Result<Value> {
        let descriptor = self.registry.try_resolve(id, Kind::Component)?;
        unsafe { read_uninit(&descriptor, block) }
    }

    /// Write a component value into `block`.
    #[inline]
    pub fn write_component(
        &self,
        id: Id,
        value: &dyn Any,
        block: &mut [MaybeUninit<u8>],
    ) -> Result<()> {
        write(&self.registry.try_resolve(id, Kind::Component)?, value, block)
    }

    /// Read an action value; `None` produces the default value.
    #[inline]
    pub fn read_action(&self, id: Id, block: Option<&[u8]>) -> Result<Value> {
        read(&self.registry.try_resolve(id, Kind::Action)?, block)
    }

    /// Read an action value from a block filled by [`write_action`](Self::write_action).
    ///
    /// # Safety
    ///
    /// See [`read_uninit`].
    #[inline]
    pub unsafe fn read_action_uninit(
        &self,
        id: Id,
        block: Option<&[MaybeUninit<u8>]>,
    ) -> Result<Value> {
        let descriptor = self.registry.try_resolve(id, Kind::Action)?;
        unsafe { read_uninit(&descriptor, block) }
    }

    /// Write an action value into `block`.
    #[inline]
    pub fn write_action(
        &self,
        id: Id,
        value: &dyn Any,
        block: &mut [MaybeUninit<u8>],
    ) -> Result<()> {
        write(&self.registry.try_resolve(id, Kind::Action)?, value, block)
    }
}
