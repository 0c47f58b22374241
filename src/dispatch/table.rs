//! Per-class dispatch tables

use core::ffi::c_void;
use core::ptr::{self, NonNull};
use std::sync::atomic::{AtomicPtr, Ordering};

use dashmap::DashMap;
use once_cell::sync::Lazy;

use super::{HostFn, MethodIndex};
use crate::error::{BridgeError, Result};
use crate::logging::debug;

/// Class name -> table, for hosts that look tables up by name
static TABLES: Lazy<DashMap<&'static str, &'static DispatchTable>> = Lazy::new(DashMap::new);

/// Ordered function-pointer slots for one bound class, one per virtual
/// method, slot 0 being the destructor callback.
///
/// `AtomicPtr<()>` has the layout of `*mut ()`, so the slot array is a valid
/// `void (*[])(void)` for hosts that fill it directly.
pub struct DispatchTable {
    class: &'static str,
    slots: Box<[AtomicPtr<()>]>,
}

impl DispatchTable {
    /// Empty table with `len` slots
    pub fn new(class: &'static str, len: usize) -> Self {
        Self {
            class,
            slots: (0..len).map(|_| AtomicPtr::new(ptr::null_mut())).collect(),
        }
    }

    pub fn class_name(&self) -> &'static str {
        self.class
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn set_slot<F: HostFn>(&self, index: MethodIndex, f: F) -> Result<()> {
        self.cell(index)?.store(f.into_raw().as_ptr(), Ordering::Release);
        Ok(())
    }

    /// Store an untyped pointer, as handed over by the C side
    ///
    /// # Safety
    /// `f` must be null or a function with the signature the generated
    /// bindings use for this slot.
    pub unsafe fn set_raw(&self, index: MethodIndex, f: *mut c_void) -> Result<()> {
        self.cell(index)?.store(f.cast(), Ordering::Release);
        Ok(())
    }

    pub fn clear_slot(&self, index: MethodIndex) -> Result<()> {
        self.cell(index)?.store(ptr::null_mut(), Ordering::Release);
        Ok(())
    }

    pub fn is_populated(&self, index: MethodIndex) -> bool {
        self.slots
            .get(index.get())
            .map(|slot| !slot.load(Ordering::Acquire).is_null())
            .unwrap_or(false)
    }

    /// Read a slot back as `F`
    ///
    /// # Safety
    /// The slot must be empty or hold a function of exactly type `F`.
    pub unsafe fn slot<F: HostFn>(&self, index: MethodIndex) -> Option<F> {
        let raw = self.slots.get(index.get())?.load(Ordering::Acquire);
        NonNull::new(raw).map(|raw| F::from_raw(raw))
    }

    /// The slot array as the C side sees it
    pub fn as_raw_slots(&self) -> *mut *mut c_void {
        self.slots.as_ptr() as *mut *mut c_void
    }

    fn cell(&self, index: MethodIndex) -> Result<&AtomicPtr<()>> {
        self.slots.get(index.get()).ok_or(BridgeError::SlotOutOfRange {
            class: self.class,
            index: index.get(),
            len: self.slots.len(),
        })
    }
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let populated: Vec<usize> = (0..self.len())
            .filter(|i| self.is_populated(MethodIndex::new(*i)))
            .collect();
        f.debug_struct("DispatchTable")
            .field("class", &self.class)
            .field("len", &self.len())
            .field("populated", &populated)
            .finish()
    }
}

/// Make a table reachable by class name. Registering a class twice replaces
/// the earlier table.
pub fn register_table(table: &'static DispatchTable) {
    debug!(
        target: "wrapper_lib::dispatch",
        class = table.class_name(),
        slots = table.len(),
        "dispatch table registered"
    );
    TABLES.insert(table.class_name(), table);
}

pub fn lookup_table(class: &str) -> Option<&'static DispatchTable> {
    TABLES.get(class).map(|entry| *entry.value())
}
