//! Refcount hook installation and standalone userdata references

use core::ffi::c_void;

use crate::boundary;
use crate::handle::{self, AdjustRefcountFn, HostHandle, UserData};
use crate::logging::{debug, warn};

/// Install the host's `adjust_refcount(handle, delta)`. Must happen before
/// any native object holding a host reference is created. NULL uninstalls:
/// references dropped afterwards are logged and leaked, new ones fail.
#[no_mangle]
pub extern "C" fn wl_install_adjust_refcount(hook: Option<AdjustRefcountFn>) {
    match hook {
        Some(hook) => {
            handle::install_adjust_refcount(hook);
            debug!(target: "wrapper_lib::handle", "adjust_refcount hook installed");
        }
        None => {
            handle::uninstall_adjust_refcount();
            warn!(target: "wrapper_lib::handle", "adjust_refcount hook removed");
        }
    }
}

/// New counted reference to `handle`; delete with `wl_userdata_delete`
#[no_mangle]
pub extern "C" fn wl_userdata_new(handle: *mut c_void) -> *mut c_void {
    boundary::construct("wl_userdata_new", || {
        Ok(UserData::from_handle(HostHandle::from_raw(handle)))
    })
}

/// # Safety
/// `userdata` must come from `wl_userdata_new` or `wl_userdata_clone`.
#[no_mangle]
pub unsafe extern "C" fn wl_userdata_clone(userdata: *const c_void) -> *mut c_void {
    boundary::with_instance(
        "wl_userdata_clone",
        userdata,
        |data: &UserData| Ok(data.clone()),
        |copy| Ok(Box::into_raw(Box::new(copy)).cast()),
    )
}

/// # Safety
/// `userdata` must be null or an undeleted userdata pointer.
#[no_mangle]
pub unsafe extern "C" fn wl_userdata_delete(userdata: *mut c_void) {
    boundary::destroy::<UserData>("wl_userdata_delete", userdata);
}

/// The referenced handle, borrowed
///
/// # Safety
/// `userdata` must come from `wl_userdata_new` or `wl_userdata_clone`.
#[no_mangle]
pub unsafe extern "C" fn wl_userdata_handle(userdata: *const c_void) -> *mut c_void {
    boundary::with_instance(
        "wl_userdata_handle",
        userdata,
        |data: &UserData| Ok(data.get_handle()),
        Ok,
    )
}
