//! Panic containment
//!
//! A Rust panic is the native-exception analogue here: it must be stopped at
//! the entry point and reported through the channel, never unwound into the
//! host.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{BridgeError, Result};

/// Run `f`, converting a panic into `BridgeError::Panic`
pub fn catch<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(BridgeError::Panic(panic_message(payload.as_ref()))),
    }
}

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
