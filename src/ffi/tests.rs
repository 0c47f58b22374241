use core::ffi::{c_char, c_void, CStr};

use once_cell::sync::Lazy;

use super::*;
use crate::convert::{c_string_from_str, string_from_c};
use crate::dispatch::{register_table, DispatchTable, MethodIndex, Overridable};
use crate::test_support::{count, install_counting_hook, new_handle};

fn c_text(text: &str) -> *mut c_char {
    c_string_from_str(text).unwrap()
}

unsafe fn take_text(ptr: *mut c_char) -> String {
    let text = string_from_c(ptr).unwrap();
    wl_free(ptr.cast());
    text
}

#[test]
fn test_version_matches_package() {
    let version = unsafe { CStr::from_ptr(wl_version()) };
    assert_eq!(version.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_init_is_repeatable() {
    assert!(wl_init());
    assert!(wl_init());
    wl_clear_error();
}

#[test]
fn test_error_round_trip() {
    wl_clear_error();
    let (name, message) = (c_text("ValueError"), c_text("bad width"));
    unsafe { wl_set_error(name, message) };
    unsafe {
        wl_free(name.cast());
        wl_free(message.cast());
    }
    assert!(wl_has_error());

    let mut name: *mut c_char = core::ptr::null_mut();
    let mut message: *mut c_char = core::ptr::null_mut();
    assert!(unsafe { wl_fetch_error(&mut name, &mut message) });
    assert_eq!(unsafe { take_text(name) }, "ValueError");
    assert_eq!(unsafe { take_text(message) }, "bad width");

    assert!(!wl_has_error());
    assert!(!unsafe { wl_fetch_error(&mut name, &mut message) });
}

#[test]
fn test_set_error_with_null_message() {
    wl_clear_error();
    let name = c_text("KeyError");
    unsafe { wl_set_error(name, core::ptr::null()) };
    unsafe { wl_free(name.cast()) };

    let pending = crate::exception::take_error().unwrap();
    assert_eq!(pending.name, "KeyError");
    assert_eq!(pending.message, "");
}

#[test]
fn test_userdata_lifecycle() {
    install_counting_hook();
    let handle = new_handle();

    let data = wl_userdata_new(handle.as_raw());
    let copy = unsafe { wl_userdata_clone(data) };
    assert_eq!(count(handle), 2);
    assert_eq!(unsafe { wl_userdata_handle(copy) }, handle.as_raw());

    unsafe {
        wl_userdata_delete(data);
        wl_userdata_delete(copy);
    }
    assert_eq!(count(handle), 0);
}

struct Plain;

static PLAIN_TABLE: Lazy<DispatchTable> = Lazy::new(|| DispatchTable::new("FfiPlain", 3));

unsafe extern "C" fn noop(_this: *mut c_void) {}

#[test]
fn test_vtable_and_flags() {
    wl_clear_error();
    register_table(&PLAIN_TABLE);

    let class = c_text("FfiPlain");
    let table = unsafe { wl_vtable_lookup(class) };
    unsafe { wl_free(class.cast()) };
    assert!(!table.is_null());
    assert_eq!(unsafe { wl_vtable_len(table) }, 3);

    assert!(unsafe { wl_vtable_set_slot(table, 2, noop as *mut c_void) });
    assert!(PLAIN_TABLE.is_populated(MethodIndex::new(2)));
    assert!(!unsafe { wl_vtable_set_slot(table, 7, noop as *mut c_void) });
    assert_eq!(crate::exception::take_error().unwrap().name, "IndexError");
    assert!(unsafe { wl_vtable_set_slot(table, 2, core::ptr::null_mut()) });

    let obj = Overridable::new(Plain, &PLAIN_TABLE);
    let opaque = obj.as_opaque();
    assert!(unsafe { wl_set_vflag(opaque, 1) });
    assert!(unsafe { wl_has_vflag(opaque, 1) });
    assert!(unsafe { wl_clear_vflag(opaque, 1) });
    assert!(!obj.is_overridden(MethodIndex::new(1)));

    let bytes = [0u8, 1, 1];
    assert!(unsafe { wl_set_vflags(opaque, bytes.as_ptr(), bytes.len()) });
    assert!(obj.is_overridden(MethodIndex::new(2)));
    assert!(!unsafe { wl_has_vflag(core::ptr::null(), 2) });
}

#[test]
fn test_vtable_lookup_unknown_class() {
    wl_clear_error();
    let class = c_text("NoSuchClass");
    assert!(unsafe { wl_vtable_lookup(class) }.is_null());
    unsafe { wl_free(class.cast()) };
    assert_eq!(crate::exception::take_error().unwrap().name, "KeyError");
}

#[test]
fn test_registry_functions() {
    install_counting_hook();
    wl_clear_error();
    let handle = new_handle();
    let parent_handle = new_handle();
    let ptr = (handle.as_raw() as usize + 4) as *mut c_void;
    let parent = (parent_handle.as_raw() as usize + 4) as *mut c_void;

    let class = c_text("Button");
    assert!(unsafe { wl_registry_register(ptr, class, handle.as_raw()) });
    assert!(unsafe { wl_registry_register(parent, class, parent_handle.as_raw()) });
    unsafe { wl_free(class.cast()) };

    assert_eq!(wl_registry_lookup(ptr), handle.as_raw());
    assert_eq!(unsafe { take_text(wl_registry_class_name(ptr)) }, "Button");
    assert!(wl_registry_is_host_owned(ptr));

    assert!(wl_registry_give_ownership(ptr, parent, false));
    assert!(!wl_registry_is_host_owned(ptr));
    assert_eq!(count(handle), 1);

    assert!(wl_registry_forget(parent));
    assert!(wl_registry_lookup(ptr).is_null());
    assert_eq!(count(handle), 0);

    assert!(!wl_registry_forget(ptr));
    assert_eq!(crate::exception::take_error().unwrap().name, "KeyError");
}
