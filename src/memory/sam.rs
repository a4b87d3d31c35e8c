/*
    Copyright (C) 2024  The PAGEXFER authors

    This file is part of PAGEXFER, a Rust library for moving raw binary data
    in and out of the banked memory of an emulated 8-bit computer.

    For the full copyright notice, see the lib.rs file.
*/
use core::fmt;
use core::ops::Range;

use super::{Result,
    PagedMemory,
    PageSlot,
    MemoryError,
    PAGE_SIZE,
    N_PAGES_MAIN,
    MEMORY_SIZE};

/// A banked memory with a single 16k ROM0 page followed by 32 pages of 16k RAM.
///
/// Both ROM0 and RAM pages live in one contiguous buffer laid out in the linear address
/// order, so the buffer offset of a byte equals its linear address.
#[derive(Clone)]
pub struct SamMemory {
    mem: Box<[u8]>
}

impl Default for SamMemory {
    fn default() -> Self {
        SamMemory { mem: vec![0;MEMORY_SIZE].into_boxed_slice() }
    }
}

impl fmt::Debug for SamMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SamMemory")
         .field("size", &self.mem.len())
         .finish()
    }
}

impl SamMemory {
    /// Returns a continuous view of the whole memory: ROM0 and all RAM pages.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.mem
    }
    /// Returns a continuous mutable view of the whole memory: ROM0 and all RAM pages.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.mem
    }

    #[inline]
    fn slot_range(slot: PageSlot) -> Result<Range<usize>> {
        let start = match slot {
            PageSlot::Rom => 0,
            PageSlot::Ram(index) if (index as usize) < N_PAGES_MAIN => {
                (index as usize + 1) * PAGE_SIZE
            }
            PageSlot::Ram(..) => return Err(MemoryError::InvalidPageIndex)
        };
        Ok(start..start + PAGE_SIZE)
    }
}

impl PagedMemory for SamMemory {
    const PAGE_SIZE: usize = PAGE_SIZE;
    const RAM_PAGES: usize = N_PAGES_MAIN;

    fn reset(&mut self) {
        for p in self.mem[PAGE_SIZE..].iter_mut() {
            *p = 0;
        }
    }

    #[inline]
    fn page_ref(&self, slot: PageSlot) -> Result<&[u8]> {
        let range = Self::slot_range(slot)?;
        Ok(&self.mem[range])
    }

    #[inline]
    fn page_mut(&mut self, slot: PageSlot) -> Result<&mut [u8]> {
        let range = Self::slot_range(slot)?;
        Ok(&mut self.mem[range])
    }
}
