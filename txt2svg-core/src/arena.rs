//! Host-side ledger for the guest's bump allocator.
//!
//! The guest allocator has no free: `wasm_reset_heap` is the only way to
//! reclaim memory, and it invalidates every pointer handed out before it.
//! [`Arena`] makes that visible on the host side. Each reset advances an
//! epoch, every allocation is returned as an [`ArenaSlot`] stamped with the
//! epoch it belongs to, and reads or writes through a slot from an older
//! epoch fail with `StaleSlot`.
//!
//! ```text
//! epoch 4: reset ─ alloc(text) ─ alloc(color) ─ alloc(font) ─ alloc(out)
//! epoch 5: reset ─ ...                 (every epoch-4 slot is now stale)
//! ```

use crate::error::{Result, Txt2SvgError};
use crate::guest::GuestModule;
use std::ops::Range;

/// A region of guest memory handed out by the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaSlot {
    offset: u32,
    len: u32,
    epoch: u64,
}

impl ArenaSlot {
    /// Offset of the region in linear memory.
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    /// Length of the region in bytes.
    pub const fn len(&self) -> u32 {
        self.len
    }

    /// Check if the region is zero-length.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Epoch the region was allocated in.
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    fn range(&self) -> Range<usize> {
        self.offset as usize..self.offset as usize + self.len as usize
    }
}

/// Epoch-tagged view of a guest's bump allocator.
#[derive(Debug, Default)]
pub struct Arena {
    /// Incremented on every reset. Zero means "never reset".
    epoch: u64,
    /// Allocations made in the current epoch.
    allocations: u32,
    /// Bytes allocated in the current epoch.
    allocated_bytes: u64,
}

impl Arena {
    /// Create a ledger for a guest that has not been reset yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current epoch.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Get the number of allocations made since the last reset.
    pub fn allocations(&self) -> u32 {
        self.allocations
    }

    /// Get the number of bytes allocated since the last reset.
    pub fn allocated_bytes(&self) -> u64 {
        self.allocated_bytes
    }

    /// Rewind the guest allocator and start a new epoch.
    pub fn reset<G: GuestModule + ?Sized>(&mut self, guest: &mut G) -> Result<()> {
        guest.reset_heap()?;
        self.epoch += 1;
        self.allocations = 0;
        self.allocated_bytes = 0;
        Ok(())
    }

    /// Allocate `len` bytes in the guest.
    ///
    /// Fails with `ArenaExhausted` when the returned region does not lie
    /// inside linear memory, and refuses to allocate before the first reset.
    pub fn allocate<G: GuestModule + ?Sized>(
        &mut self,
        guest: &mut G,
        len: u32,
    ) -> Result<ArenaSlot> {
        if self.epoch == 0 {
            return Err(Txt2SvgError::StaleSlot {
                slot_epoch: 0,
                current_epoch: 0,
            });
        }

        let offset = guest.alloc(len)?;
        let memory_size = guest.memory().len();
        let end = offset as u64 + len as u64;
        if end > memory_size as u64 {
            return Err(Txt2SvgError::ArenaExhausted {
                requested: len,
                offset,
                memory_size,
            });
        }

        self.allocations += 1;
        self.allocated_bytes += len as u64;

        Ok(ArenaSlot {
            offset,
            len,
            epoch: self.epoch,
        })
    }

    /// Allocate a region and copy `bytes` into it.
    pub fn alloc_bytes<G: GuestModule + ?Sized>(
        &mut self,
        guest: &mut G,
        bytes: &[u8],
    ) -> Result<ArenaSlot> {
        let len = u32::try_from(bytes.len()).map_err(|_| Txt2SvgError::ArenaExhausted {
            requested: u32::MAX,
            offset: 0,
            memory_size: guest.memory().len(),
        })?;
        let slot = self.allocate(guest, len)?;
        self.write(guest, slot, bytes)?;
        Ok(slot)
    }

    /// Allocate a region holding `s` followed by a NUL terminator.
    pub fn alloc_cstr<G: GuestModule + ?Sized>(
        &mut self,
        guest: &mut G,
        s: &str,
    ) -> Result<ArenaSlot> {
        let mut buf = Vec::with_capacity(s.len() + 1);
        buf.extend_from_slice(s.as_bytes());
        buf.push(0);
        self.alloc_bytes(guest, &buf)
    }

    /// Copy `bytes` to the start of `slot`.
    pub fn write<G: GuestModule + ?Sized>(
        &self,
        guest: &mut G,
        slot: ArenaSlot,
        bytes: &[u8],
    ) -> Result<()> {
        self.check(slot)?;
        let memory_size = guest.memory().len();
        let dest = guest
            .memory_mut()
            .get_mut(slot.range())
            .and_then(|region| region.get_mut(..bytes.len()));
        match dest {
            Some(dest) => {
                dest.copy_from_slice(bytes);
                Ok(())
            }
            None => Err(Txt2SvgError::ArenaExhausted {
                requested: bytes.len() as u32,
                offset: slot.offset,
                memory_size,
            }),
        }
    }

    /// Set every byte of `slot` to `byte`.
    pub fn fill<G: GuestModule + ?Sized>(
        &self,
        guest: &mut G,
        slot: ArenaSlot,
        byte: u8,
    ) -> Result<()> {
        self.check(slot)?;
        let memory_size = guest.memory().len();
        match guest.memory_mut().get_mut(slot.range()) {
            Some(region) => {
                region.fill(byte);
                Ok(())
            }
            None => Err(Txt2SvgError::ArenaExhausted {
                requested: slot.len,
                offset: slot.offset,
                memory_size,
            }),
        }
    }

    /// Borrow the bytes of `slot`.
    pub fn read<'g, G: GuestModule + ?Sized>(
        &self,
        guest: &'g G,
        slot: ArenaSlot,
    ) -> Result<&'g [u8]> {
        self.check(slot)?;
        let memory = guest.memory();
        memory
            .get(slot.range())
            .ok_or(Txt2SvgError::ArenaExhausted {
                requested: slot.len,
                offset: slot.offset,
                memory_size: memory.len(),
            })
    }

    fn check(&self, slot: ArenaSlot) -> Result<()> {
        if slot.epoch == self.epoch {
            Ok(())
        } else {
            Err(Txt2SvgError::StaleSlot {
                slot_epoch: slot.epoch,
                current_epoch: self.epoch,
            })
        }
    }
}
