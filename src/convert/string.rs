//! Strings travel as NUL-terminated, malloc'd `char*`
//!
//! The host frees what it receives with `wl_free` (plain `free`). A string
//! holding an interior NUL has no C view and fails to convert.

use core::ffi::{c_char, CStr};

use super::{alloc_array, non_null, MappedType};
use crate::error::{BridgeError, Result};
use crate::logging::log_conversion_failure;

impl MappedType for String {
    type CRepr = *mut c_char;
    const C_NAME: &'static str = "char*";
    const NATIVE_NAME: &'static str = "String";

    fn to_c(&self) -> Result<*mut c_char> {
        c_string_from_str(self)
    }

    unsafe fn to_cpp(c: *mut c_char) -> Result<Box<Self>> {
        string_from_c(c).map(Box::new)
    }

    unsafe fn release_c(c: *mut c_char) {
        super::free_c(c.cast());
    }
}

/// malloc'd NUL-terminated copy of `s`
///
/// Fails with a conversion error when `s` contains a NUL byte.
pub fn c_string_from_str(s: &str) -> Result<*mut c_char> {
    let bytes = s.as_bytes();
    if let Some(pos) = bytes.iter().position(|&b| b == 0) {
        let reason = format!("interior NUL at byte {pos}");
        log_conversion_failure("String", "char*", &reason);
        return Err(BridgeError::conversion("String", "char*", reason));
    }
    let buffer = alloc_array::<u8>(bytes.len() + 1)?;
    // SAFETY: buffer holds len + 1 bytes and cannot overlap `bytes`
    unsafe {
        core::ptr::copy_nonoverlapping(bytes.as_ptr(), buffer, bytes.len());
        buffer.add(bytes.len()).write(0);
    }
    Ok(buffer.cast())
}

/// Owned copy of a borrowed C string
///
/// # Safety
/// `c` must be null or point to a NUL-terminated buffer.
pub unsafe fn string_from_c(c: *const c_char) -> Result<String> {
    let c = non_null(c, "char*", "String")?;
    CStr::from_ptr(c)
        .to_str()
        .map(str::to_owned)
        .map_err(|err| {
            let reason = format!("invalid UTF-8 at byte {}", err.valid_up_to());
            log_conversion_failure("char*", "String", &reason);
            BridgeError::conversion("char*", "String", reason)
        })
}
