//! Conversion protocol - native values <-> flat C representations
//!
//! Design: symmetric and allocation based, so entry points treat every
//! argument and return the same way:
//! - `to_c` hands ownership of pointer representations to the caller and
//!   fails only on values with no C view (or when allocation fails)
//! - `to_cpp` always allocates a fresh native value, failing only on
//!   documented sentinels (null, malformed buffers)
//! - arrays convert element-wise into a fresh buffer of exactly `n` elements,
//!   all or nothing
//!
//! Architecture:
//! - `primitive.rs` - identity mapping for C scalars
//! - `string.rs` - `String` <-> malloc'd `char*`
//! - `wrapped.rs` - classes passed as opaque pointers

mod primitive;
mod string;
mod wrapped;

pub use string::{c_string_from_str, string_from_c};
pub use wrapped::{
    as_opaque, wrapped_from_c, wrapped_to_c_array, wrapped_to_cpp_array, WrappedType,
};

use crate::error::{BridgeError, Result};
use crate::logging::log_conversion_failure;

/// A native value type with its own flat C representation
pub trait MappedType: Sized {
    /// Flat representation passed across the boundary
    type CRepr: Copy;

    /// C type name, for diagnostics
    const C_NAME: &'static str;

    /// Native type name, for diagnostics
    const NATIVE_NAME: &'static str;

    /// Build the C representation of `self`
    fn to_c(&self) -> Result<Self::CRepr>;

    /// Build a new heap value from its C representation
    ///
    /// # Safety
    /// Pointer representations must be null or valid for reads.
    unsafe fn to_cpp(c: Self::CRepr) -> Result<Box<Self>>;

    /// Release a representation produced by `to_c`. No-op for by-value ones.
    ///
    /// # Safety
    /// `c` must come from `to_c` and not have been released already.
    unsafe fn release_c(_c: Self::CRepr) {}
}

/// Convert a slice into a malloc'd array of exactly `items.len()` C values.
///
/// The caller owns the buffer; release it with `free_c_array`. If any
/// element fails to convert, the elements already written and the buffer
/// are released before the error is returned.
pub fn to_c_array<T: MappedType>(items: &[T]) -> Result<*mut T::CRepr> {
    let buffer = alloc_array::<T::CRepr>(items.len())?;
    for (i, item) in items.iter().enumerate() {
        match item.to_c() {
            // SAFETY: `buffer` holds `items.len()` slots
            Ok(c) => unsafe { buffer.add(i).write(c) },
            Err(err) => {
                // SAFETY: exactly the first `i` slots are initialized
                unsafe { free_c_array::<T>(buffer, i) };
                return Err(err);
            }
        }
    }
    Ok(buffer)
}

/// Convert `count` C values into a fresh native array.
///
/// Either every element converts or the whole conversion fails; elements
/// converted before the failure are dropped.
///
/// # Safety
/// `array` must be valid for `count` reads (it may be null only when
/// `count` is zero).
pub unsafe fn to_cpp_array<T: MappedType>(array: *const T::CRepr, count: usize) -> Result<Box<[T]>> {
    if count == 0 {
        return Ok(Box::default());
    }
    if array.is_null() {
        log_conversion_failure(T::C_NAME, T::NATIVE_NAME, "null array");
        return Err(BridgeError::conversion(T::C_NAME, T::NATIVE_NAME, "null array"));
    }

    let mut items = Vec::with_capacity(count);
    for i in 0..count {
        let value = T::to_cpp(*array.add(i))?;
        items.push(*value);
    }
    Ok(items.into_boxed_slice())
}

/// Release an array built by `to_c_array`, element representations included
///
/// # Safety
/// `array` must come from `to_c_array::<T>` with the same `count`.
pub unsafe fn free_c_array<T: MappedType>(array: *mut T::CRepr, count: usize) {
    if array.is_null() {
        return;
    }
    for i in 0..count {
        T::release_c(*array.add(i));
    }
    libc::free(array.cast());
}

/// malloc'd buffer for `count` values of `C`; never null on success
pub(crate) fn alloc_array<C>(count: usize) -> Result<*mut C> {
    let size = core::mem::size_of::<C>()
        .checked_mul(count)
        .ok_or(BridgeError::Allocation { size: usize::MAX })?;

    // malloc(0) may return null; always ask for at least one byte
    // SAFETY: plain allocation, checked for null below
    let buffer = unsafe { libc::malloc(size.max(1)) } as *mut C;
    if buffer.is_null() {
        return Err(BridgeError::Allocation { size });
    }
    Ok(buffer)
}

/// Release a buffer that was handed to the host with malloc
///
/// # Safety
/// `ptr` must be null or come from this crate's C allocations.
pub unsafe fn free_c(ptr: *mut core::ffi::c_void) {
    if !ptr.is_null() {
        libc::free(ptr);
    }
}

/// Null-checked conversion of a borrowed pointer argument
pub(crate) fn non_null<T>(ptr: *const T, from: &'static str, to: &'static str) -> Result<*const T> {
    if ptr.is_null() {
        log_conversion_failure(from, to, "null pointer");
        Err(BridgeError::conversion(from, to, "null pointer"))
    } else {
        Ok(ptr)
    }
}
