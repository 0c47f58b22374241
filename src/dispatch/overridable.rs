//! Native objects whose virtual methods the host may override per instance

use core::cell::RefCell;
use core::ffi::c_void;

use super::{DispatchTable, HostFn, MethodIndex, OverrideFlags};
use crate::config;
use crate::convert::{MappedType, WrappedType};
use crate::error::Result;
use crate::exception;
use crate::logging::{error, log_dispatch};

/// Destructor callback stored in slot 0
pub type DestructorFn = unsafe extern "C" fn(*mut c_void);

/// Type-erased prefix of every `Overridable<T>`
///
/// The C side only ever sees `*mut c_void`; flag updates go through this
/// header without knowing `T`.
#[repr(C)]
pub struct VirtualHeader {
    flags: RefCell<OverrideFlags>,
    table: &'static DispatchTable,
}

impl VirtualHeader {
    pub fn table(&self) -> &'static DispatchTable {
        self.table
    }

    pub fn is_overridden(&self, index: MethodIndex) -> bool {
        self.flags.borrow().get(index)
    }

    pub fn set_flag(&self, index: MethodIndex, overridden: bool) -> Result<()> {
        self.flags.borrow_mut().set(index, overridden)
    }

    pub fn set_flags(&self, bytes: &[u8]) {
        self.flags.borrow_mut().set_from_bytes(bytes);
    }

    pub fn flags(&self) -> OverrideFlags {
        self.flags.borrow().clone()
    }
}

/// A native `T` plus the host-override state for one instance
#[repr(C)]
pub struct Overridable<T> {
    header: VirtualHeader,
    base: T,
}

impl<T> Overridable<T> {
    /// No method overridden until the host says so
    pub fn new(base: T, table: &'static DispatchTable) -> Self {
        Self {
            header: VirtualHeader {
                flags: RefCell::new(OverrideFlags::new(table.len())),
                table,
            },
            base,
        }
    }

    pub fn base(&self) -> &T {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut T {
        &mut self.base
    }

    pub fn header(&self) -> &VirtualHeader {
        &self.header
    }

    /// The pointer passed back to host overrides as `this`
    pub fn as_opaque(&self) -> *mut c_void {
        self as *const Self as *mut c_void
    }

    pub fn set_flag(&self, index: MethodIndex, overridden: bool) -> Result<()> {
        self.header.set_flag(index, overridden)
    }

    pub fn set_flags(&self, bytes: &[u8]) {
        self.header.set_flags(bytes);
    }

    pub fn clear_flag(&self, index: MethodIndex) -> Result<()> {
        self.header.set_flag(index, false)
    }

    pub fn is_overridden(&self, index: MethodIndex) -> bool {
        self.header.is_overridden(index)
    }

    /// Route one virtual call.
    ///
    /// With the flag at `index` set, slot `index` is read as `F` and handed
    /// to `host` together with `this`; otherwise `native` runs against the
    /// base object. `native` must call the base implementation directly,
    /// never back through this dispatch.
    ///
    /// # Safety
    /// Slot `index` must be empty or hold a function of type `F`.
    pub unsafe fn dispatch<F: HostFn, R>(
        &self,
        index: MethodIndex,
        host: impl FnOnce(F, *mut c_void) -> R,
        native: impl FnOnce(&T) -> R,
    ) -> R {
        // The flag borrow ends here, before any host code can run
        let overridden = self.is_overridden(index);
        log_dispatch(self.header.table.class_name(), index.get(), overridden);

        if overridden {
            match self.header.table.slot::<F>(index) {
                Some(f) => return host(f, self.as_opaque()),
                None if config::get().dispatch.fallback_on_empty_slot => {
                    error!(
                        target: "wrapper_lib::dispatch",
                        class = self.header.table.class_name(),
                        index = index.get(),
                        "override flag set on an empty slot, calling the native implementation"
                    );
                }
                None => panic!(
                    "override flag set on empty slot {} of {}",
                    index.get(),
                    self.header.table.class_name()
                ),
            }
        }
        native(&self.base)
    }
}

impl<T> Drop for Overridable<T> {
    fn drop(&mut self) {
        // SAFETY: slot 0 is reserved for `DestructorFn`
        if let Some(notify) = unsafe { self.header.table.slot::<DestructorFn>(MethodIndex::DESTRUCTOR) } {
            unsafe { notify(self.as_opaque()) };
        }
    }
}

impl<T: WrappedType> WrappedType for Overridable<T> {
    const CLASS_NAME: &'static str = T::CLASS_NAME;
}

/// Header of an opaque `Overridable<_>` pointer
///
/// # Safety
/// `ptr` must point to a live `Overridable<T>` for some `T`.
pub unsafe fn header_from_opaque<'a>(ptr: *const c_void) -> &'a VirtualHeader {
    &*ptr.cast::<VirtualHeader>()
}

/// Take over the C result of a host override returning a mapped type.
///
/// An error the override left pending wins over the returned value. Either
/// way `c` is released.
///
/// # Safety
/// `c` must be a representation `T::release_c` may free, or null.
pub unsafe fn take_host_result<T: MappedType>(c: T::CRepr) -> Result<T> {
    let converted = exception::check().and_then(|()| T::to_cpp(c));
    T::release_c(c);
    converted.map(|value| *value)
}

/// Body of a generated native override for one virtual method.
///
/// ```ignore
/// fn negate(&self, i: i32) -> i32 {
///     dispatch_virtual!(self.0, NEGATE, fn(i: i32) -> i32, |base| base.negate_base(i))
/// }
///
/// // mapped return: the override hands back a `char*`; the native closure
/// // needs its argument type spelled out
/// fn describe(&self) -> Result<String> {
///     dispatch_virtual!(self.0, DESCRIBE, fn() -> *mut c_char as String, |base: &Shape| base.describe_base())
/// }
/// ```
#[macro_export]
macro_rules! dispatch_virtual {
    ($this:expr, $index:expr, fn($($arg:ident : $ty:ty),* $(,)?) -> $cret:ty as $ret:ty, $native:expr) => {{
        let this = &$this;
        unsafe {
            this.dispatch::<unsafe extern "C" fn(*mut ::core::ffi::c_void $(, $ty)*) -> $cret, $crate::Result<$ret>>(
                $index,
                |f, ptr| $crate::dispatch::take_host_result::<$ret>(f(ptr $(, $arg)*)),
                |base| ::core::result::Result::Ok(($native)(base)),
            )
        }
    }};
    ($this:expr, $index:expr, fn($($arg:ident : $ty:ty),* $(,)?) -> $ret:ty, $native:expr) => {{
        let this = &$this;
        unsafe {
            this.dispatch::<unsafe extern "C" fn(*mut ::core::ffi::c_void $(, $ty)*) -> $ret, $ret>(
                $index,
                |f, ptr| f(ptr $(, $arg)*),
                $native,
            )
        }
    }};
}
