//! Raw callback slots and the function-pointer types that may live in them

use core::marker::PhantomData;
use core::ptr::{self, NonNull};
use std::sync::atomic::{AtomicPtr, Ordering};

/// A C function pointer type that can be stored in an untyped slot.
///
/// # Safety
/// Implementors must be plain function pointers (pointer-sized, never null).
/// Reading a slot back as `F` is only sound when the stored pointer really
/// has signature `F`; that is the host's half of the contract.
pub unsafe trait HostFn: Copy + 'static {
    fn into_raw(self) -> NonNull<()>;

    /// # Safety
    /// `raw` must have been produced from a function of exactly this type.
    unsafe fn from_raw(raw: NonNull<()>) -> Self;
}

macro_rules! impl_host_fn {
    ($($arg:ident),*) => {
        unsafe impl<R: 'static, $($arg: 'static),*> HostFn for extern "C" fn($($arg),*) -> R {
            #[inline]
            fn into_raw(self) -> NonNull<()> {
                // SAFETY: function pointers are never null
                unsafe { NonNull::new_unchecked(self as *mut ()) }
            }

            #[inline]
            unsafe fn from_raw(raw: NonNull<()>) -> Self {
                core::mem::transmute_copy::<NonNull<()>, Self>(&raw)
            }
        }

        unsafe impl<R: 'static, $($arg: 'static),*> HostFn for unsafe extern "C" fn($($arg),*) -> R {
            #[inline]
            fn into_raw(self) -> NonNull<()> {
                // SAFETY: function pointers are never null
                unsafe { NonNull::new_unchecked(self as *mut ()) }
            }

            #[inline]
            unsafe fn from_raw(raw: NonNull<()>) -> Self {
                core::mem::transmute_copy::<NonNull<()>, Self>(&raw)
            }
        }
    };
}

impl_host_fn!();
impl_host_fn!(A);
impl_host_fn!(A, B);
impl_host_fn!(A, B, C);
impl_host_fn!(A, B, C, D);
impl_host_fn!(A, B, C, D, E);
impl_host_fn!(A, B, C, D, E, F);
impl_host_fn!(A, B, C, D, E, F, G);
impl_host_fn!(A, B, C, D, E, F, G, H);

/// Process-wide slot for a single host callback
///
/// Declared as a `static` next to the code that calls it; the host fills it
/// once at startup.
pub struct HostFnSlot<F: HostFn> {
    name: &'static str,
    ptr: AtomicPtr<()>,
    _marker: PhantomData<F>,
}

impl<F: HostFn> HostFnSlot<F> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            ptr: AtomicPtr::new(ptr::null_mut()),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn install(&self, f: F) {
        self.ptr.store(f.into_raw().as_ptr(), Ordering::Release);
    }

    /// Install `Some`, clear on `None` (the C side passes NULL to uninstall)
    pub fn set(&self, f: Option<F>) {
        match f {
            Some(f) => self.install(f),
            None => self.clear(),
        }
    }

    pub fn clear(&self) {
        self.ptr.store(ptr::null_mut(), Ordering::Release);
    }

    pub fn get(&self) -> Option<F> {
        // SAFETY: only `install` writes a non-null value, always of type F
        NonNull::new(self.ptr.load(Ordering::Acquire)).map(|raw| unsafe { F::from_raw(raw) })
    }

    pub fn is_installed(&self) -> bool {
        !self.ptr.load(Ordering::Acquire).is_null()
    }
}
