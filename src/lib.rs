//! wrapper_lib - runtime support for flat C bindings of C++ class hierarchies
//!
//! Generated bindings expose native classes to a dynamically-typed host
//! through plain `extern "C"` functions. This crate is the part those
//! functions lean on:
//!
//! 1. `convert` - value <-> C representation (mapped and wrapped types, arrays)
//! 2. `handle` - host handles whose refcount follows native object lifetime
//! 3. `dispatch` - per-class slot tables and per-instance override flags
//! 4. `exception` - the pending-error channel read by the host after each call
//! 5. `boundary` - the sequencing every generated entry point goes through
//!
//! plus the object `registry`, a host-backed input `stream`, `config` and
//! `logging`. The flat C surface lives in `ffi`.

pub mod boundary;
pub mod config;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod exception;
pub mod ffi;
pub mod handle;
pub mod logging;
pub mod registry;
pub mod stream;

#[cfg(test)]
pub(crate) mod test_support;

pub use boundary::{FailureValue, ReturnPolicy, Returned};
pub use config::BridgeConfig;
pub use convert::{MappedType, WrappedType};
pub use dispatch::{DispatchTable, HostFn, HostFnSlot, MethodIndex, Overridable, OverrideFlags};
pub use error::{BridgeError, Result};
pub use exception::PendingError;
pub use handle::{HandleTable, HostHandle, HostRef, UserData};
pub use registry::{ObjectRegistry, Ownership};
