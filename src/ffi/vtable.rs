//! Dispatch tables and per-instance override flags from the C side
//!
//! Instances are `Overridable<_>` pointers; only their type-erased header
//! is touched here.

use core::ffi::{c_char, c_void};

use crate::boundary;
use crate::convert::string_from_c;
use crate::dispatch::{header_from_opaque, lookup_table, DispatchTable, MethodIndex};
use crate::error::BridgeError;

/// Table registered for `class`, or NULL (with a pending `KeyError`)
///
/// # Safety
/// `class` must be null or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn wl_vtable_lookup(class: *const c_char) -> *const c_void {
    boundary::entry(
        "wl_vtable_lookup",
        || {
            let class = string_from_c(class)?;
            lookup_table(&class).ok_or_else(|| BridgeError::Host {
                name: "KeyError".to_string(),
                message: format!("no dispatch table registered for {class}"),
            })
        },
        |table| Ok(table as *const DispatchTable as *const c_void),
    )
}

/// # Safety
/// `table` must come from `wl_vtable_lookup`.
#[no_mangle]
pub unsafe extern "C" fn wl_vtable_len(table: *const c_void) -> usize {
    boundary::with_instance("wl_vtable_len", table, |table: &DispatchTable| Ok(table.len()), Ok)
}

/// The slot array, writable in place by the host
///
/// # Safety
/// `table` must come from `wl_vtable_lookup`.
#[no_mangle]
pub unsafe extern "C" fn wl_vtable_slots(table: *const c_void) -> *mut *mut c_void {
    boundary::with_instance(
        "wl_vtable_slots",
        table,
        |table: &DispatchTable| Ok(table.as_raw_slots()),
        Ok,
    )
}

/// Store `f` in slot `index`; NULL empties the slot
///
/// # Safety
/// `table` must come from `wl_vtable_lookup`; `f` must have the signature
/// the bindings expect for that slot.
#[no_mangle]
pub unsafe extern "C" fn wl_vtable_set_slot(table: *const c_void, index: usize, f: *mut c_void) -> bool {
    boundary::with_instance(
        "wl_vtable_set_slot",
        table,
        |table: &DispatchTable| table.set_raw(MethodIndex::new(index), f).map(|_| true),
        Ok,
    )
}

/// # Safety
/// `obj` must point to a live `Overridable<_>`.
#[no_mangle]
pub unsafe extern "C" fn wl_set_vflag(obj: *mut c_void, index: usize) -> bool {
    update_flag("wl_set_vflag", obj, index, true)
}

/// # Safety
/// `obj` must point to a live `Overridable<_>`.
#[no_mangle]
pub unsafe extern "C" fn wl_clear_vflag(obj: *mut c_void, index: usize) -> bool {
    update_flag("wl_clear_vflag", obj, index, false)
}

/// Replace all flags from `count` bytes, nonzero meaning overridden
///
/// # Safety
/// `obj` must point to a live `Overridable<_>`; `flags` must be valid for
/// `count` reads.
#[no_mangle]
pub unsafe extern "C" fn wl_set_vflags(obj: *mut c_void, flags: *const u8, count: usize) -> bool {
    boundary::entry(
        "wl_set_vflags",
        || {
            if obj.is_null() {
                return Err(BridgeError::NullInstance("wl_set_vflags"));
            }
            let bytes = if count == 0 {
                &[][..]
            } else if flags.is_null() {
                return Err(BridgeError::conversion("uint8_t*", "OverrideFlags", "null array"));
            } else {
                core::slice::from_raw_parts(flags, count)
            };
            header_from_opaque(obj).set_flags(bytes);
            Ok(true)
        },
        Ok,
    )
}

/// # Safety
/// `obj` must point to a live `Overridable<_>`.
#[no_mangle]
pub unsafe extern "C" fn wl_has_vflag(obj: *const c_void, index: usize) -> bool {
    if obj.is_null() {
        return false;
    }
    header_from_opaque(obj).is_overridden(MethodIndex::new(index))
}

unsafe fn update_flag(entry: &'static str, obj: *mut c_void, index: usize, overridden: bool) -> bool {
    boundary::entry(
        entry,
        || {
            if obj.is_null() {
                return Err(BridgeError::NullInstance(entry));
            }
            header_from_opaque(obj)
                .set_flag(MethodIndex::new(index), overridden)
                .map(|_| true)
        },
        Ok,
    )
}
