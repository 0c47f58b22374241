//! Handle -> count book for hosts written in Rust

use core::ffi::c_void;

use dashmap::DashMap;

use super::HostHandle;
use crate::logging::warn;

/// Concurrent record of how many native references each handle has.
///
/// Suitable as the body of an `adjust_refcount` hook. A handle disappears
/// from the table as soon as its count drops back to zero.
#[derive(Debug, Default)]
pub struct HandleTable {
    counts: DashMap<usize, i64>,
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `delta`; returns the new count
    pub fn adjust(&self, handle: *mut c_void, delta: i32) -> i64 {
        let key = handle as usize;
        if delta < 0 && !self.counts.contains_key(&key) {
            warn!(
                target: "wrapper_lib::handle",
                handle = ?handle,
                delta,
                "release of a handle with no references"
            );
            return 0;
        }

        let count = {
            let mut entry = self.counts.entry(key).or_insert(0);
            *entry += i64::from(delta);
            *entry
        };
        if count <= 0 {
            self.counts.remove_if(&key, |_, count| *count <= 0);
        }
        count
    }

    pub fn count(&self, handle: *mut c_void) -> i64 {
        self.counts.get(&(handle as usize)).map(|c| *c).unwrap_or(0)
    }

    pub fn is_live(&self, handle: *mut c_void) -> bool {
        self.count(handle) > 0
    }

    pub fn live_handles(&self) -> Vec<HostHandle> {
        self.counts
            .iter()
            .map(|entry| HostHandle::from_raw(*entry.key() as *mut c_void))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
