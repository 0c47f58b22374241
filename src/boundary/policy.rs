//! Who releases a returned object
//!
//! Generated bindings annotate every pointer-returning method with one of
//! these; nothing is inferred from the native signature.

use core::ffi::c_void;

/// Ownership convention for a returned wrapped object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnPolicy {
    /// Returned by value; a heap copy is handed over, caller deletes it
    Owned,
    /// Native heap object whose ownership moves to the caller
    Transfer,
    /// Pointer into native-owned storage; the caller must not delete it and
    /// must not use it past the owner's lifetime
    Borrowed,
    /// Returned by reference but annotated as copy; caller deletes the copy
    Copied,
}

impl ReturnPolicy {
    /// Whether the host must call the class's `op_delete` on the result
    pub fn caller_owns(self) -> bool {
        !matches!(self, ReturnPolicy::Borrowed)
    }
}

/// A method result together with its ownership convention
#[derive(Debug)]
pub enum Returned<'a, T> {
    Value(T),
    Boxed(Box<T>),
    Ref(&'a T),
    CopyOf(&'a T),
}

impl<'a, T> Returned<'a, T> {
    pub fn policy(&self) -> ReturnPolicy {
        match self {
            Returned::Value(_) => ReturnPolicy::Owned,
            Returned::Boxed(_) => ReturnPolicy::Transfer,
            Returned::Ref(_) => ReturnPolicy::Borrowed,
            Returned::CopyOf(_) => ReturnPolicy::Copied,
        }
    }
}

impl<'a, T: Clone> Returned<'a, T> {
    /// Opaque pointer for the host, honouring the policy
    pub fn into_c(self) -> *mut c_void {
        match self {
            Returned::Value(value) => Box::into_raw(Box::new(value)).cast(),
            Returned::Boxed(boxed) => Box::into_raw(boxed).cast(),
            Returned::Ref(borrowed) => borrowed as *const T as *mut c_void,
            Returned::CopyOf(source) => Box::into_raw(Box::new(source.clone())).cast(),
        }
    }
}
