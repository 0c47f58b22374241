//! Boundary entry points - the sequence every generated `extern "C"` wrapper
//! runs through
//!
//! 1. convert arguments (`convert`, `handle`)
//! 2. run the native operation with panics contained
//! 3. check the error channel; on failure return the failure sentinel and
//!    leave the error for the host
//! 4. convert the result, handing ownership over per `ReturnPolicy`
//!
//! Nothing here unwinds into the host.

use core::ffi::c_void;

use crate::convert::MappedType;
use crate::error::{BridgeError, Result};
use crate::exception::{self, catch};
use crate::logging::{log_boundary_call, log_boundary_failure, warn};

mod policy;

pub use policy::{ReturnPolicy, Returned};

/// Value an entry point returns when it failed. The host learns about the
/// failure from the error channel, never from the value alone.
pub trait FailureValue {
    fn failure() -> Self;
}

macro_rules! failure_value {
    ($value:expr => $($ty:ty),*) => {
        $(
            impl FailureValue for $ty {
                #[inline]
                fn failure() -> Self {
                    $value
                }
            }
        )*
    };
}

failure_value!(0 => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
failure_value!(0.0 => f32, f64);
failure_value!(false => bool);
failure_value!(() => ());

impl<T> FailureValue for *mut T {
    fn failure() -> Self {
        core::ptr::null_mut()
    }
}

impl<T> FailureValue for *const T {
    fn failure() -> Self {
        core::ptr::null()
    }
}

/// Run native code on behalf of `entry`.
///
/// `None` means the call failed and the error channel says why: `f`
/// returned `Err`, panicked, or reached a host callback that raised. In the
/// last case the native result is dropped here.
pub fn call_native<N>(entry: &'static str, f: impl FnOnce() -> Result<N>) -> Option<N> {
    log_boundary_call(entry);
    if let Some(stale) = exception::peek_error() {
        warn!(
            target: "wrapper_lib::boundary",
            entry,
            exception = %stale.name,
            "entering with an unconsumed error; the host skipped a check"
        );
    }

    match catch(f) {
        Ok(value) if exception::has_error() => {
            drop(value);
            report_failure(entry);
            None
        }
        Ok(value) => Some(value),
        Err(err) => {
            fail(entry, &err);
            None
        }
    }
}

/// Full entry point: native call, error check, result conversion
pub fn entry<N, C: FailureValue>(
    entry: &'static str,
    native: impl FnOnce() -> Result<N>,
    to_c: impl FnOnce(N) -> Result<C>,
) -> C {
    let Some(value) = call_native(entry, native) else {
        return C::failure();
    };
    match catch(|| to_c(value)) {
        Ok(c) => c,
        Err(err) => {
            fail(entry, &err);
            C::failure()
        }
    }
}

/// `op_new`: build a `T` and hand the host an owning pointer
pub fn construct<T>(entry_name: &'static str, ctor: impl FnOnce() -> Result<T>) -> *mut c_void {
    entry(entry_name, ctor, |value| Ok(Box::into_raw(Box::new(value)).cast()))
}

/// `op_delete`. Null is ignored.
///
/// # Safety
/// `this` must be null or come from `construct::<T>` (or a `Transfer`/
/// `Owned`/`Copied` return of `T`) and not have been deleted yet.
pub unsafe fn destroy<T>(entry_name: &'static str, this: *mut c_void) {
    if this.is_null() {
        return;
    }
    call_native(entry_name, || {
        drop(Box::from_raw(this.cast::<T>()));
        Ok(())
    });
}

/// Method entry point on a shared borrow of the instance.
///
/// Host overrides reached from `method` may call back into the same object
/// through other `with_instance` entries.
///
/// # Safety
/// `this` must be null or point to a live `T`.
pub unsafe fn with_instance<T, N, C: FailureValue>(
    entry_name: &'static str,
    this: *const c_void,
    method: impl FnOnce(&T) -> Result<N>,
    to_c: impl FnOnce(N) -> Result<C>,
) -> C {
    if this.is_null() {
        fail(entry_name, &BridgeError::NullInstance(entry_name));
        return C::failure();
    }
    let instance = &*this.cast::<T>();
    entry(entry_name, || method(instance), to_c)
}

/// Method entry point on an exclusive borrow of the instance.
///
/// # Safety
/// `this` must be null or point to a live `T`, and `method` must not reach
/// any host callback that could re-enter the same object.
pub unsafe fn with_instance_mut<T, N, C: FailureValue>(
    entry_name: &'static str,
    this: *mut c_void,
    method: impl FnOnce(&mut T) -> Result<N>,
    to_c: impl FnOnce(N) -> Result<C>,
) -> C {
    if this.is_null() {
        fail(entry_name, &BridgeError::NullInstance(entry_name));
        return C::failure();
    }
    let instance = &mut *this.cast::<T>();
    entry(entry_name, || method(instance), to_c)
}

/// Field getter
///
/// A field that fails to convert leaves its error pending and returns the
/// failure value.
///
/// # Safety
/// As `with_instance`.
pub unsafe fn get_field<T, F>(
    entry_name: &'static str,
    this: *const c_void,
    field: impl FnOnce(&T) -> &F,
) -> F::CRepr
where
    F: MappedType,
    F::CRepr: FailureValue,
{
    with_instance(entry_name, this, |instance: &T| field(instance).to_c(), Ok)
}

/// Field setter; the field keeps its old value when conversion fails
///
/// # Safety
/// As `with_instance_mut`, and `value` must satisfy `F::to_cpp`.
pub unsafe fn set_field<T, F: MappedType>(
    entry_name: &'static str,
    this: *mut c_void,
    value: F::CRepr,
    field: impl FnOnce(&mut T) -> &mut F,
) {
    with_instance_mut(
        entry_name,
        this,
        |instance: &mut T| {
            let converted = F::to_cpp(value)?;
            *field(instance) = *converted;
            Ok(())
        },
        Ok,
    )
}

/// `op_new` of an abstract class or one with a protected constructor
pub fn reject_abstract(entry_name: &'static str, class: &'static str) -> *mut c_void {
    log_boundary_call(entry_name);
    fail(entry_name, &BridgeError::Abstract(class));
    core::ptr::null_mut()
}

fn fail(entry: &'static str, err: &BridgeError) {
    exception::raise(err);
    report_failure(entry);
}

fn report_failure(entry: &'static str) {
    if let Some(pending) = exception::peek_error() {
        log_boundary_failure(entry, &pending.name, &pending.message);
    }
}
