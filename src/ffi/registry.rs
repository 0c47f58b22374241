//! Object registry from the C side

use core::ffi::{c_char, c_void};

use crate::boundary;
use crate::convert::{c_string_from_str, string_from_c};
use crate::error::BridgeError;
use crate::handle::HostHandle;
use crate::registry::registry;

/// # Safety
/// `class` must be null or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn wl_registry_register(
    ptr: *mut c_void,
    class: *const c_char,
    handle: *mut c_void,
) -> bool {
    boundary::entry(
        "wl_registry_register",
        || {
            let class = string_from_c(class)?;
            registry().register(ptr, &class, HostHandle::from_raw(handle))?;
            Ok(true)
        },
        Ok,
    )
}

/// Host object registered for `ptr`, NULL when none (no error is set)
#[no_mangle]
pub extern "C" fn wl_registry_lookup(ptr: *const c_void) -> *mut c_void {
    registry()
        .lookup(ptr)
        .map(HostHandle::as_raw)
        .unwrap_or(core::ptr::null_mut())
}

/// Registered class name as a malloc'd string (free with `wl_free`), NULL
/// with a pending `KeyError` when unknown
#[no_mangle]
pub extern "C" fn wl_registry_class_name(ptr: *const c_void) -> *mut c_char {
    boundary::entry(
        "wl_registry_class_name",
        || {
            registry()
                .class_name(ptr)
                .ok_or(BridgeError::NotRegistered { address: ptr as usize })
        },
        |name| c_string_from_str(&name),
    )
}

#[no_mangle]
pub extern "C" fn wl_registry_is_host_owned(ptr: *const c_void) -> bool {
    boundary::entry("wl_registry_is_host_owned", || registry().is_host_owned(ptr), Ok)
}

/// `parent` may be NULL
#[no_mangle]
pub extern "C" fn wl_registry_give_ownership(
    ptr: *mut c_void,
    parent: *mut c_void,
    external_ref: bool,
) -> bool {
    let parent = (!parent.is_null()).then_some(parent);
    boundary::entry(
        "wl_registry_give_ownership",
        || registry().give_ownership(ptr, parent, external_ref).map(|_| true),
        Ok,
    )
}

#[no_mangle]
pub extern "C" fn wl_registry_take_ownership(ptr: *mut c_void) -> bool {
    boundary::entry(
        "wl_registry_take_ownership",
        || registry().take_ownership(ptr).map(|_| true),
        Ok,
    )
}

/// Called by a native destructor: drop `ptr` and everything it parents
#[no_mangle]
pub extern "C" fn wl_registry_forget(ptr: *mut c_void) -> bool {
    boundary::entry("wl_registry_forget", || registry().forget(ptr).map(|_| true), Ok)
}
