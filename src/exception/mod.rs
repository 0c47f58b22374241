//! Error channel - pending error name/message handed from native code to the host
//!
//! Design: one pending error slot holding a name and a message.
//! - Native code (or a host override, through `wl_set_error`) sets it
//! - Entry points check it after any call that may have reached the host
//! - The host reads and clears it after every call that reported failure
//!
//! The slot is thread-local. Under the single-active-call model the host
//! serializes all entry into native code, so this behaves exactly like one
//! process-wide slot; native threads running concurrently simply cannot see
//! each other's errors.

use std::cell::RefCell;

use crate::config;
use crate::error::BridgeError;
use crate::logging::warn;

mod guard;

pub use guard::{catch, panic_message};

thread_local! {
    static PENDING: RefCell<Option<PendingError>> = const { RefCell::new(None) };
}

/// Error waiting to be consumed by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingError {
    pub name: String,
    pub message: String,
}

impl PendingError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl From<PendingError> for BridgeError {
    fn from(err: PendingError) -> Self {
        BridgeError::Host {
            name: err.name,
            message: err.message,
        }
    }
}

/// Store an error for the host. Replaces an unconsumed one (last write wins),
/// which always indicates a missed check somewhere.
pub fn set_error(name: &str, message: &str) {
    PENDING.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(previous) = slot.as_ref() {
            if config::get().errors.warn_on_overwrite {
                warn!(
                    target: "wrapper_lib::exception",
                    previous = %previous.name,
                    replacement = name,
                    "pending error overwritten before the host consumed it"
                );
            }
        }
        *slot = Some(PendingError::new(name, message));
    });
}

/// Store a native error under its host exception name
pub fn raise(err: &BridgeError) {
    set_error(err.exception_name(), &err.message());
}

/// Whether an error is waiting
pub fn has_error() -> bool {
    PENDING.with(|slot| slot.borrow().is_some())
}

/// Copy of the pending error, left in place
pub fn peek_error() -> Option<PendingError> {
    PENDING.with(|slot| slot.borrow().clone())
}

/// Remove and return the pending error
pub fn take_error() -> Option<PendingError> {
    PENDING.with(|slot| slot.borrow_mut().take())
}

pub fn clear_error() {
    PENDING.with(|slot| {
        slot.borrow_mut().take();
    });
}

/// Turn a pending error into `Err`, consuming it.
///
/// Native code that calls a host override directly (outside an entry point)
/// uses this to bail out right after the callback.
pub fn check() -> crate::Result<()> {
    match take_error() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
