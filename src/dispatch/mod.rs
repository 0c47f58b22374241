//! Dynamic dispatch - host overrides of native virtual methods
//!
//! Design: the host cannot take part in the native compiler's own virtual
//! tables, so every bound class gets a second, flat table of C function
//! pointers and every instance carries one override bit per method.
//! - `DispatchTable` - per-class slots, filled by the host at bind time
//! - `OverrideFlags` - per-instance bits, set when the host subclass
//!   instance is created
//! - `Overridable<T>` - native object + flags; `dispatch` picks host or base
//!
//! Slot 0 is the destructor callback. A slot is only ever called when its
//! bit is set for the instance at hand.

mod flags;
mod overridable;
mod slot;
mod table;

pub use flags::OverrideFlags;
pub use overridable::{
    header_from_opaque, take_host_result, DestructorFn, Overridable, VirtualHeader,
};
pub use slot::{HostFn, HostFnSlot};
pub use table::{lookup_table, register_table, DispatchTable};

/// Stable per-method position in a class's dispatch table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct MethodIndex(usize);

impl MethodIndex {
    /// Slot reserved for the destructor callback
    pub const DESTRUCTOR: MethodIndex = MethodIndex(0);

    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl From<usize> for MethodIndex {
    fn from(index: usize) -> Self {
        Self(index)
    }
}
