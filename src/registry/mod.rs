//! Object registry - native address -> host object, plus who owns what
//!
//! The host looks objects up by the address an entry point returned so the
//! same native object always maps to the same host object. Ownership moves
//! between the two sides:
//! - host-owned (default): the host deletes the native object
//! - native-owned: a native parent (or the native side itself) deletes it,
//!   and the registry keeps the host object alive meanwhile
//!
//! DashMap guards are never held across a second entry access or across a
//! refcount change.

use core::ffi::c_void;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use smallvec::SmallVec;

use crate::error::{BridgeError, Result};
use crate::handle::{HostHandle, UserData};
use crate::logging::debug;

static REGISTRY: Lazy<ObjectRegistry> = Lazy::new(ObjectRegistry::new);

/// Process-wide registry used by the `wl_registry_*` functions
pub fn registry() -> &'static ObjectRegistry {
    &REGISTRY
}

/// Who deletes a registered native object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Host,
    Native {
        parent: Option<usize>,
        /// Keep the host object alive even without a parent
        external_ref: bool,
    },
}

impl Ownership {
    fn parent(self) -> Option<usize> {
        match self {
            Ownership::Native { parent, .. } => parent,
            Ownership::Host => None,
        }
    }
}

struct Entry {
    class: String,
    handle: HostHandle,
    ownership: Ownership,
    keepalive: Option<UserData>,
    children: SmallVec<[usize; 4]>,
}

#[derive(Default)]
pub struct ObjectRegistry {
    entries: DashMap<usize, Entry>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a host object for `ptr`, host-owned. An address that is
    /// already registered keeps its first host object.
    pub fn register(&self, ptr: *mut c_void, class: &str, handle: HostHandle) -> Result<()> {
        if ptr.is_null() {
            return Err(BridgeError::NullInstance("ObjectRegistry::register"));
        }
        let address = ptr as usize;
        if self.entries.contains_key(&address) {
            debug!(target: "wrapper_lib::registry", address, class, "already registered");
            return Ok(());
        }
        self.entries.insert(
            address,
            Entry {
                class: class.to_string(),
                handle,
                ownership: Ownership::Host,
                keepalive: None,
                children: SmallVec::new(),
            },
        );
        debug!(target: "wrapper_lib::registry", address, class, "registered");
        Ok(())
    }

    pub fn lookup(&self, ptr: *const c_void) -> Option<HostHandle> {
        self.entries.get(&(ptr as usize)).map(|entry| entry.handle)
    }

    pub fn class_name(&self, ptr: *const c_void) -> Option<String> {
        self.entries.get(&(ptr as usize)).map(|entry| entry.class.clone())
    }

    pub fn ownership(&self, ptr: *const c_void) -> Result<Ownership> {
        let address = ptr as usize;
        self.entries
            .get(&address)
            .map(|entry| entry.ownership)
            .ok_or(BridgeError::NotRegistered { address })
    }

    pub fn is_host_owned(&self, ptr: *const c_void) -> Result<bool> {
        Ok(self.ownership(ptr)? == Ownership::Host)
    }

    /// Addresses whose lifetime is tied to `ptr`
    pub fn children(&self, ptr: *const c_void) -> Vec<usize> {
        self.entries
            .get(&(ptr as usize))
            .map(|entry| entry.children.to_vec())
            .unwrap_or_default()
    }

    pub fn contains(&self, ptr: *const c_void) -> bool {
        self.entries.contains_key(&(ptr as usize))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hand `ptr` to the native side. With a parent, `ptr` lives until the
    /// parent is forgotten; the host object is kept alive meanwhile. Without
    /// one, `external_ref` decides whether the host object is kept alive.
    pub fn give_ownership(
        &self,
        ptr: *mut c_void,
        parent: Option<*mut c_void>,
        external_ref: bool,
    ) -> Result<()> {
        let address = ptr as usize;
        let parent = parent.map(|p| p as usize);
        if let Some(parent) = parent {
            if parent == address || !self.entries.contains_key(&parent) {
                return Err(BridgeError::NotRegistered { address: parent });
            }
        }

        let (handle, previous, had_keepalive) = {
            let entry = self
                .entries
                .get(&address)
                .ok_or(BridgeError::NotRegistered { address })?;
            (entry.handle, entry.ownership, entry.keepalive.is_some())
        };

        let wants_keepalive = parent.is_some() || external_ref;
        // Taken before touching the entry: the hook may reach back into us
        let new_keepalive = (wants_keepalive && !had_keepalive).then(|| UserData::from_handle(handle));

        let released = {
            let mut entry = self
                .entries
                .get_mut(&address)
                .ok_or(BridgeError::NotRegistered { address })?;
            entry.ownership = Ownership::Native {
                parent,
                external_ref,
            };
            if wants_keepalive {
                if new_keepalive.is_some() {
                    entry.keepalive = new_keepalive;
                }
                None
            } else {
                entry.keepalive.take()
            }
        };
        drop(released);

        if previous.parent() != parent {
            if let Some(old) = previous.parent() {
                self.detach_child(old, address);
            }
            if let Some(parent) = parent {
                if let Some(mut entry) = self.entries.get_mut(&parent) {
                    entry.children.push(address);
                }
            }
        }

        debug!(
            target: "wrapper_lib::registry",
            address,
            parent = ?parent,
            external_ref,
            "ownership given to native side"
        );
        Ok(())
    }

    /// The host owns `ptr` again
    pub fn take_ownership(&self, ptr: *mut c_void) -> Result<()> {
        let address = ptr as usize;
        let (previous, released) = {
            let mut entry = self
                .entries
                .get_mut(&address)
                .ok_or(BridgeError::NotRegistered { address })?;
            let previous = entry.ownership;
            entry.ownership = Ownership::Host;
            (previous, entry.keepalive.take())
        };
        drop(released);

        if let Some(parent) = previous.parent() {
            self.detach_child(parent, address);
        }
        debug!(target: "wrapper_lib::registry", address, "ownership taken by host");
        Ok(())
    }

    /// The native object at `ptr` is gone: drop its entry and, recursively,
    /// those of its children.
    pub fn forget(&self, ptr: *mut c_void) -> Result<()> {
        let address = ptr as usize;
        let (_, root) = self
            .entries
            .remove(&address)
            .ok_or(BridgeError::NotRegistered { address })?;

        if let Some(parent) = root.ownership.parent() {
            self.detach_child(parent, address);
        }

        let mut pending: Vec<usize> = root.children.to_vec();
        drop(root);
        let mut forgotten = 1usize;
        while let Some(child) = pending.pop() {
            if let Some((_, entry)) = self.entries.remove(&child) {
                pending.extend(entry.children.iter().copied());
                forgotten += 1;
            }
        }

        debug!(target: "wrapper_lib::registry", address, forgotten, "forgotten");
        Ok(())
    }

    fn detach_child(&self, parent: usize, child: usize) {
        if let Some(mut entry) = self.entries.get_mut(&parent) {
            entry.children.retain(|c| *c != child);
        }
    }
}
