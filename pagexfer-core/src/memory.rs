/*
    Copyright (C) 2024  The PAGEXFER authors

    This file is part of PAGEXFER, a Rust library for moving raw binary data
    in and out of the banked memory of an emulated 8-bit computer.

    For the full copyright notice, see the lib.rs file.
*/
//! Memory API.
use core::fmt;
use core::hash::Hasher;
use std::io::{self, Read, Write};

use fnv::FnvHasher;
#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

/// The size of a single memory page in bytes.
pub const PAGE_SIZE: usize = 0x4000;
/// The number of RAM pages in the physical page table.
pub const N_PAGES_MAIN: usize = 32;
/// The size of the RAM (all pages) in bytes.
pub const RAM_SIZE: usize = N_PAGES_MAIN * PAGE_SIZE;
/// The size of the whole linear address space: the ROM0 page followed by all RAM pages.
pub const MEMORY_SIZE: usize = PAGE_SIZE + RAM_SIZE;
/// Mask applied to the user provided page numbers.
pub const PAGE_MASK: u8 = 0x1F;
/// Mask of an offset into a page.
pub const OFFSET_MASK: u16 = (PAGE_SIZE - 1) as u16;

#[non_exhaustive]
#[derive(Debug)]
pub enum MemoryError {
    InvalidPageIndex,
    Io(io::Error)
}

impl std::error::Error for MemoryError {}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", match self {
            MemoryError::InvalidPageIndex => "Memory page index is out of range",
            MemoryError::Io(err) => return err.fmt(f)
        })
    }
}

impl From<MemoryError> for io::Error {
    fn from(err: MemoryError) -> Self {
        match err {
            MemoryError::Io(err) => err,
            e => io::Error::new(io::ErrorKind::InvalidInput, e)
        }
    }
}

/// A type returned by some of [PagedMemory] methods.
pub type Result<T> = core::result::Result<T, MemoryError>;

/// Identifies a single physical memory page.
///
/// The ROM0 page is a distinct slot and not a numeric index into the RAM page table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
pub enum PageSlot {
    /// The fixed ROM page visible below the first page boundary.
    Rom,
    /// A RAM page index into the physical page table.
    Ram(u8)
}

impl PageSlot {
    /// Returns the slot following `self` in a page table of `page_count` RAM pages.
    ///
    /// The ROM slot is followed by RAM page 0 and the last RAM page wraps back to 0.
    /// A `page_count` above 256 is clamped to 256, the number of addressable slots.
    #[inline]
    pub fn next(self, page_count: usize) -> PageSlot {
        let page_count = page_count.min(u8::MAX as usize + 1);
        match self {
            PageSlot::Rom => PageSlot::Ram(0),
            PageSlot::Ram(index) => {
                let index = index as usize + 1;
                if index >= page_count {
                    PageSlot::Ram(0)
                }
                else {
                    PageSlot::Ram(index as u8)
                }
            }
        }
    }

    #[inline]
    pub fn is_rom(self) -> bool {
        self == PageSlot::Rom
    }

    /// Returns the RAM page index or `None` for the ROM slot.
    #[inline]
    pub fn ram_index(self) -> Option<u8> {
        match self {
            PageSlot::Ram(index) => Some(index),
            PageSlot::Rom => None
        }
    }
}

impl fmt::Display for PageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSlot::Rom => f.write_str("ROM0"),
            PageSlot::Ram(index) => write!(f, "{}", index)
        }
    }
}

/// Returns an iterator of all RAM slots of a page table with `page_count` pages.
pub fn ram_slots(page_count: usize) -> impl Iterator<Item=PageSlot> {
    (0..page_count.min(u8::MAX as usize + 1)).map(|index| PageSlot::Ram(index as u8))
}

/// An interface to the physical pages of a banked memory.
///
/// Implementations own the page buffers; this trait hands out bounds-checked
/// slices of exactly [PagedMemory::PAGE_SIZE] bytes.
pub trait PagedMemory {
    /// The size of every page slice returned by this memory.
    const PAGE_SIZE: usize = PAGE_SIZE;
    /// The number of RAM pages in the physical page table.
    const RAM_PAGES: usize;

    /// Resets RAM contents. ROM is left intact.
    fn reset(&mut self);
    /// Returns a page slice.
    ///
    /// # Errors
    /// [MemoryError::InvalidPageIndex] if a RAM index is not below `RAM_PAGES`.
    fn page_ref(&self, slot: PageSlot) -> Result<&[u8]>;
    /// Returns a mutable page slice.
    ///
    /// # Errors
    /// [MemoryError::InvalidPageIndex] if a RAM index is not below `RAM_PAGES`.
    fn page_mut(&mut self, slot: PageSlot) -> Result<&mut [u8]>;
    /// Returns the ROM0 page.
    #[inline]
    fn rom_ref(&self) -> Result<&[u8]> {
        self.page_ref(PageSlot::Rom)
    }
    /// Returns the mutable ROM0 page.
    #[inline]
    fn rom_mut(&mut self) -> Result<&mut [u8]> {
        self.page_mut(PageSlot::Rom)
    }
    /// Writes the ROM0 page.
    fn save_rom<W: Write>(&self, mut wr: W) -> Result<()> {
        wr.write_all(self.rom_ref()?).map_err(MemoryError::Io)
    }
    /// Returns a RAM page by its index.
    fn ram_page_ref(&self, index: usize) -> Result<&[u8]> {
        if index >= Self::RAM_PAGES || index > u8::max_value() as usize {
            return Err(MemoryError::InvalidPageIndex)
        }
        self.page_ref(PageSlot::Ram(index as u8))
    }
    /// Returns a mutable RAM page by its index.
    fn ram_page_mut(&mut self, index: usize) -> Result<&mut [u8]> {
        if index >= Self::RAM_PAGES || index > u8::max_value() as usize {
            return Err(MemoryError::InvalidPageIndex)
        }
        self.page_mut(PageSlot::Ram(index as u8))
    }
    /// Results in an error when the rom data size is less than the page size.
    fn load_into_rom<R: Read>(&mut self, mut rd: R) -> Result<()> {
        let slice = self.rom_mut()?;
        rd.read_exact(slice).map_err(MemoryError::Io)
    }
    /// Reads all RAM pages in order. Results in an error when fewer bytes are available.
    fn load_into_ram<R: Read>(&mut self, mut rd: R) -> Result<()> {
        for slot in ram_slots(Self::RAM_PAGES) {
            rd.read_exact(self.page_mut(slot)?).map_err(MemoryError::Io)?;
        }
        Ok(())
    }
    /// Writes all RAM pages in order.
    fn save_ram<W: Write>(&self, mut wr: W) -> Result<()> {
        for slot in ram_slots(Self::RAM_PAGES) {
            wr.write_all(self.page_ref(slot)?).map_err(MemoryError::Io)?;
        }
        Ok(())
    }
    /// Fills all RAM pages with the data produced by the closure F.
    ///
    /// Usefull to fill RAM with random bytes.
    fn fill_ram<F: FnMut() -> u8>(&mut self, mut f: F) -> Result<()> {
        for slot in ram_slots(Self::RAM_PAGES) {
            for p in self.page_mut(slot)?.iter_mut() {
                *p = f()
            }
        }
        Ok(())
    }
    /// Returns a FNV-1a hash of the ROM slot followed by all RAM pages.
    fn checksum(&self) -> Result<u64> {
        let mut hasher = FnvHasher::default();
        hasher.write(self.page_ref(PageSlot::Rom)?);
        for slot in ram_slots(Self::RAM_PAGES) {
            hasher.write(self.page_ref(slot)?);
        }
        Ok(hasher.finish())
    }
}
