//! Wrapped classes cross the boundary as opaque pointers
//!
//! The pointer is the native object's address; the host never looks inside.
//! Ownership of the pointee is decided by the entry point (see
//! `boundary::ReturnPolicy`), not by the conversion.

use core::ffi::c_void;

use super::{alloc_array, non_null};
use crate::error::{BridgeError, Result};
use crate::logging::log_conversion_failure;

/// A native class exposed to the host by pointer
pub trait WrappedType: Sized + 'static {
    /// Class name as the host sees it
    const CLASS_NAME: &'static str;
}

/// Opaque view of a borrowed instance
#[inline]
pub fn as_opaque<T: WrappedType>(value: &T) -> *mut c_void {
    value as *const T as *mut c_void
}

/// Borrow the instance behind an opaque pointer
///
/// # Safety
/// `ptr` must be null or point to a live `T` for the whole of `'a`.
pub unsafe fn wrapped_from_c<'a, T: WrappedType>(ptr: *const c_void) -> Result<&'a T> {
    let ptr = non_null(ptr, "void*", T::CLASS_NAME)?;
    Ok(&*ptr.cast::<T>())
}

/// malloc'd array of pointers into `items`; the elements stay borrowed
pub fn wrapped_to_c_array<T: WrappedType>(items: &mut [T]) -> Result<*mut *mut c_void> {
    let buffer = alloc_array::<*mut c_void>(items.len())?;
    for (i, item) in items.iter_mut().enumerate() {
        // SAFETY: `buffer` holds `items.len()` slots
        unsafe { buffer.add(i).write(item as *mut T as *mut c_void) };
    }
    Ok(buffer)
}

/// Copy `count` pointed-to instances into a fresh native array.
///
/// A null element fails the whole conversion.
///
/// # Safety
/// `array` must be valid for `count` reads and every non-null element must
/// point to a live `T`.
pub unsafe fn wrapped_to_cpp_array<T: WrappedType + Clone>(
    array: *const *mut c_void,
    count: usize,
) -> Result<Box<[T]>> {
    if count == 0 {
        return Ok(Box::default());
    }
    let array = non_null(array, "void**", T::CLASS_NAME)?;

    let mut items = Vec::with_capacity(count);
    for i in 0..count {
        let element = *array.add(i);
        if element.is_null() {
            let reason = format!("null element at index {i}");
            log_conversion_failure("void**", T::CLASS_NAME, &reason);
            return Err(BridgeError::conversion("void**", T::CLASS_NAME, reason));
        }
        items.push((*element.cast::<T>()).clone());
    }
    Ok(items.into_boxed_slice())
}
