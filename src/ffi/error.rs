//! Error channel access for the host and for host overrides

use core::ffi::c_char;

use crate::convert::{c_string_from_str, string_from_c};
use crate::exception;
use crate::logging::error;

/// Raise from a host override. NULL name or message are stored empty.
///
/// # Safety
/// Both pointers must be null or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn wl_set_error(name: *const c_char, message: *const c_char) {
    let name = read_or_empty(name);
    let message = read_or_empty(message);
    exception::set_error(&name, &message);
}

#[no_mangle]
pub extern "C" fn wl_has_error() -> bool {
    exception::has_error()
}

/// Move the pending error out. On true, `*name` and `*message` receive
/// malloc'd strings the caller releases with `wl_free`; the channel is
/// cleared either way.
///
/// # Safety
/// `name` and `message` must be null or valid for one pointer write.
#[no_mangle]
pub unsafe extern "C" fn wl_fetch_error(name: *mut *mut c_char, message: *mut *mut c_char) -> bool {
    let Some(pending) = exception::take_error() else {
        return false;
    };
    write_string(name, &pending.name);
    write_string(message, &pending.message);
    true
}

#[no_mangle]
pub extern "C" fn wl_clear_error() {
    exception::clear_error();
}

unsafe fn read_or_empty(text: *const c_char) -> String {
    if text.is_null() {
        return String::new();
    }
    match string_from_c(text) {
        Ok(text) => text,
        Err(_) => String::from_utf8_lossy(core::ffi::CStr::from_ptr(text).to_bytes()).into_owned(),
    }
}

unsafe fn write_string(out: *mut *mut c_char, text: &str) {
    if out.is_null() {
        return;
    }
    *out = match c_string_from_str(text) {
        Ok(copy) => copy,
        Err(err) => {
            error!(target: "wrapper_lib::exception", %err, "cannot copy error text for the host");
            core::ptr::null_mut()
        }
    };
}
