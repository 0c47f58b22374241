//! Per-instance override bits

use bitvec::prelude::*;

use super::MethodIndex;
use crate::error::{BridgeError, Result};

/// One bit per dispatch slot: set when the host overrode that method for
/// this instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideFlags {
    bits: BitVec<u8, Lsb0>,
}

impl OverrideFlags {
    /// All methods native
    pub fn new(len: usize) -> Self {
        Self {
            bits: BitVec::repeat(false, len),
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Out-of-range indices read as "not overridden"
    pub fn get(&self, index: MethodIndex) -> bool {
        self.bits.get(index.get()).map(|bit| *bit).unwrap_or(false)
    }

    pub fn set(&mut self, index: MethodIndex, overridden: bool) -> Result<()> {
        let len = self.bits.len();
        match self.bits.get_mut(index.get()) {
            Some(mut bit) => {
                *bit = overridden;
                Ok(())
            }
            None => Err(BridgeError::SlotOutOfRange {
                class: "OverrideFlags",
                index: index.get(),
                len,
            }),
        }
    }

    pub fn clear(&mut self) {
        self.bits.fill(false);
    }

    /// Import one byte per slot (nonzero = overridden). Bytes past the
    /// table length are ignored; missing ones leave their bit unset.
    pub fn set_from_bytes(&mut self, bytes: &[u8]) {
        self.clear();
        for (mut bit, byte) in self.bits.iter_mut().zip(bytes) {
            *bit = *byte != 0;
        }
    }

    pub fn any(&self) -> bool {
        self.bits.any()
    }

    /// Indices of overridden methods
    pub fn iter_set(&self) -> impl Iterator<Item = MethodIndex> + '_ {
        self.bits.iter_ones().map(MethodIndex::new)
    }
}
