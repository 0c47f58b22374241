//! Host handles - references to host objects held by native code
//!
//! Design: the host owns its objects and counts references to them; native
//! code only ever holds a handle through `HostRef`, whose construction,
//! clone and drop are the only places a count changes.
//! - `new` / `clone` send `+1`
//! - `Drop` sends `-1`, unwinding included
//!
//! so any `HostRef` contributes exactly zero over its lifetime. Null handles
//! never reach the host.

use core::ffi::c_void;
use core::fmt;
use core::ops::{Deref, DerefMut};

use crate::convert::MappedType;
use crate::error::Result;

mod refcount;
mod table;

pub use refcount::{
    has_adjust_refcount, install_adjust_refcount, uninstall_adjust_refcount, AdjustRefcountFn,
};
pub use table::HandleTable;

pub(crate) use refcount::{adjust_refcount, release_refcount};

/// Opaque host object pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct HostHandle(*mut c_void);

// The handle is an identifier; the host serializes use of what it names
unsafe impl Send for HostHandle {}
unsafe impl Sync for HostHandle {}

impl HostHandle {
    pub const NULL: HostHandle = HostHandle(core::ptr::null_mut());

    pub const fn from_raw(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    pub const fn as_raw(self) -> *mut c_void {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

/// Native value holding a counted reference to a host object
pub struct HostRef<T = ()> {
    inner: T,
    handle: HostHandle,
}

/// Plain counted reference with no native payload
pub type UserData = HostRef<()>;

impl<T> HostRef<T> {
    /// Take a reference to `handle` (`+1` unless null)
    pub fn new(inner: T, handle: HostHandle) -> Self {
        if !handle.is_null() {
            adjust_refcount(handle.as_raw(), 1);
        }
        Self { inner, handle }
    }

    /// Wrapper with no host object behind it
    pub fn empty(inner: T) -> Self {
        Self {
            inner,
            handle: HostHandle::NULL,
        }
    }

    pub fn handle(&self) -> HostHandle {
        self.handle
    }

    /// Raw handle, borrowed: the count is not touched
    pub fn get_handle(&self) -> *mut c_void {
        self.handle.as_raw()
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl UserData {
    pub fn from_handle(handle: HostHandle) -> Self {
        Self::new((), handle)
    }
}

impl<T: Clone> Clone for HostRef<T> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone(), self.handle)
    }
}

impl<T> Drop for HostRef<T> {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            release_refcount(self.handle.as_raw());
        }
    }
}

impl<T> Deref for HostRef<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> DerefMut for HostRef<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<T: fmt::Debug> fmt::Debug for HostRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostRef")
            .field("inner", &self.inner)
            .field("handle", &self.handle.as_raw())
            .finish()
    }
}

impl MappedType for UserData {
    type CRepr = *mut c_void;
    const C_NAME: &'static str = "void*";
    const NATIVE_NAME: &'static str = "UserData";

    /// Borrowed handle; the host keeps its own reference
    fn to_c(&self) -> Result<*mut c_void> {
        Ok(self.get_handle())
    }

    unsafe fn to_cpp(c: *mut c_void) -> Result<Box<Self>> {
        Ok(Box::new(Self::from_handle(HostHandle::from_raw(c))))
    }
}
