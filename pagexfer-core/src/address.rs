/*
    Copyright (C) 2024  The PAGEXFER authors

    This file is part of PAGEXFER, a Rust library for moving raw binary data
    in and out of the banked memory of an emulated 8-bit computer.

    For the full copyright notice, see the lib.rs file.
*/
//! Linear address to memory page translation.
//!
//! A linear address is the one used by BASIC: the ROM0 page occupies `0x0000..0x4000`,
//! RAM page `n` begins at `(n + 1) * 0x4000` and the whole space ends at `0x84000`.
use core::fmt;
use core::str::FromStr;

#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

use crate::memory::{PageSlot, PAGE_SIZE, MEMORY_SIZE, PAGE_MASK, OFFSET_MASK};

/// The address shown when no other address has been entered yet.
pub const DEFAULT_ADDRESS: u32 = 32768;

/// A mutually consistent linear address, page number and page offset.
///
/// Instances can only be derived from an address or from a page and offset pair,
/// so the three values can never disagree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "snapshot", serde(from = "u32", into = "u32"))]
pub struct AddressTriple {
    address: u32,
    page: u8,
    offset: u16
}

/// Selects which of the [AddressTriple] fields is the authoritative input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
pub enum AddressMode {
    /// The linear (BASIC) address is edited, the page and offset follow.
    Basic,
    /// The page number and offset are edited, the address follows.
    PageOffset
}

impl AddressTriple {
    /// Derives the page and offset from a linear `address`.
    ///
    /// Any value is accepted. Addresses below the first page boundary report page `31`,
    /// but [AddressTriple::slot] resolves them to the ROM0 page.
    #[inline]
    pub fn from_address(address: u32) -> Self {
        let page = ((address / PAGE_SIZE as u32).wrapping_sub(1) & PAGE_MASK as u32) as u8;
        let offset = (address & OFFSET_MASK as u32) as u16;
        AddressTriple { address, page, offset }
    }
    /// Computes the address of a `page` (masked to 5 bits) and `offset`, wrapped at the end
    /// of memory, and then re-derives the canonical page and offset from that address.
    pub fn from_page_offset(page: u32, offset: u32) -> Self {
        let page = u64::from(page & PAGE_MASK as u32);
        let address = ((page + 1) * PAGE_SIZE as u64 + u64::from(offset)) % MEMORY_SIZE as u64;
        Self::from_address(address as u32)
    }
    /// Returns a new triple with the address replaced.
    #[inline]
    pub fn with_address(self, address: u32) -> Self {
        Self::from_address(address)
    }
    /// Returns a new triple with the page replaced, keeping the current offset.
    #[inline]
    pub fn with_page(self, page: u32) -> Self {
        Self::from_page_offset(page, self.offset.into())
    }
    /// Returns a new triple with the offset replaced, keeping the current page.
    #[inline]
    pub fn with_offset(self, offset: u32) -> Self {
        Self::from_page_offset(self.page.into(), offset)
    }
    #[inline]
    pub fn address(self) -> u32 {
        self.address
    }
    #[inline]
    pub fn page(self) -> u8 {
        self.page
    }
    #[inline]
    pub fn offset(self) -> u16 {
        self.offset
    }
    /// Returns the physical page the address resolves to.
    #[inline]
    pub fn slot(self) -> PageSlot {
        if self.address < PAGE_SIZE as u32 {
            PageSlot::Rom
        }
        else {
            PageSlot::Ram(self.page)
        }
    }
}

impl Default for AddressTriple {
    fn default() -> Self {
        AddressTriple::from_address(DEFAULT_ADDRESS)
    }
}

impl From<u32> for AddressTriple {
    fn from(address: u32) -> Self {
        AddressTriple::from_address(address)
    }
}

impl From<AddressTriple> for u32 {
    fn from(triple: AddressTriple) -> u32 {
        triple.address
    }
}

impl fmt::Display for AddressTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (page {}, offset {})", self.address, self.slot(), self.offset)
    }
}

impl Default for AddressMode {
    fn default() -> Self {
        AddressMode::Basic
    }
}

impl AddressMode {
    /// Returns `true` if the address field accepts edits.
    #[inline]
    pub fn address_enabled(self) -> bool {
        self == AddressMode::Basic
    }
    /// Returns `true` if the page and offset fields accept edits.
    #[inline]
    pub fn page_offset_enabled(self) -> bool {
        self == AddressMode::PageOffset
    }
}

impl From<AddressMode> for &str {
    fn from(mode: AddressMode) -> Self {
        match mode {
            AddressMode::Basic      => "BASIC address",
            AddressMode::PageOffset => "Page number",
        }
    }
}

impl fmt::Display for AddressMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <&str>::from(*self).fmt(f)
    }
}

impl FromStr for AddressMode {
    type Err = &'static str;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "basic"|"Basic"|"BASIC"|"address" => Ok(AddressMode::Basic),
            "page"|"Page"|"PAGE"|"page-offset" => Ok(AddressMode::PageOffset),
            _ => Err("Unrecognized address mode")
        }
    }
}
