//! The host's refcount hook
//!
//! Every `+1`/`-1` a `HostRef` produces ends up here. The host installs the
//! hook once, before any wrapper is created.

use core::ffi::{c_int, c_void};

use crate::dispatch::HostFnSlot;
use crate::logging::{error, log_refcount};

/// `void adjust_refcount(void* handle, int delta)`
pub type AdjustRefcountFn = unsafe extern "C" fn(*mut c_void, c_int);

static ADJUST_REFCOUNT: HostFnSlot<AdjustRefcountFn> = HostFnSlot::new("adjust_refcount");

pub fn install_adjust_refcount(hook: AdjustRefcountFn) {
    ADJUST_REFCOUNT.install(hook);
}

/// Remove the hook; later refcount traffic panics
pub fn uninstall_adjust_refcount() {
    ADJUST_REFCOUNT.clear();
}

pub fn has_adjust_refcount() -> bool {
    ADJUST_REFCOUNT.is_installed()
}

/// Forward a refcount change to the host.
///
/// # Panics
/// When no hook is installed. Inside a boundary call the panic surfaces as a
/// pending `RuntimeError`.
pub(crate) fn adjust_refcount(handle: *mut c_void, delta: c_int) {
    log_refcount(handle, delta);
    match ADJUST_REFCOUNT.get() {
        // SAFETY: the host promised a function of this signature
        Some(hook) => unsafe { hook(handle, delta) },
        None => {
            error!(
                target: "wrapper_lib::handle",
                handle = ?handle,
                delta,
                "adjust_refcount hook not installed"
            );
            panic!("adjust_refcount hook not installed; call wl_install_adjust_refcount first");
        }
    }
}

/// Give back one reference on drop.
///
/// Unlike `adjust_refcount` this never panics: a destructor running during
/// unwinding must not panic again. Without a hook the decrement is logged
/// and skipped, leaving the host object alive.
pub(crate) fn release_refcount(handle: *mut c_void) {
    log_refcount(handle, -1);
    match ADJUST_REFCOUNT.get() {
        // SAFETY: the host promised a function of this signature
        Some(hook) => unsafe { hook(handle, -1) },
        None => error!(
            target: "wrapper_lib::handle",
            handle = ?handle,
            "adjust_refcount hook not installed; reference leaked"
        ),
    }
}
