//! Shared fixtures for unit tests: a counting refcount hook and fresh handles

use core::ffi::{c_int, c_void};
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::Lazy;

use crate::handle::{install_adjust_refcount, HandleTable, HostHandle};

pub(crate) static COUNTS: Lazy<HandleTable> = Lazy::new(HandleTable::new);

static NEXT_HANDLE: AtomicUsize = AtomicUsize::new(0x1000);

unsafe extern "C" fn counting_hook(handle: *mut c_void, delta: c_int) {
    COUNTS.adjust(handle, delta);
}

/// Install the counting hook (idempotent)
pub(crate) fn install_counting_hook() {
    install_adjust_refcount(counting_hook);
}

/// A handle no other test uses. Never dereferenced.
pub(crate) fn new_handle() -> HostHandle {
    let address = NEXT_HANDLE.fetch_add(0x10, Ordering::Relaxed);
    HostHandle::from_raw(address as *mut c_void)
}

pub(crate) fn count(handle: HostHandle) -> i64 {
    COUNTS.count(handle.as_raw())
}
