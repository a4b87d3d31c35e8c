/*
    Copyright (C) 2024  The PAGEXFER authors

    This file is part of PAGEXFER, a Rust library for moving raw binary data
    in and out of the banked memory of an emulated 8-bit computer.

    PAGEXFER is free software: you can redistribute it and/or modify it under
    the terms of the GNU Lesser General Public License (LGPL) as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    PAGEXFER is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Lesser General Public License for more details.

    You should have received a copy of the GNU Lesser General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.

    Author contact information: see Cargo.toml file, section [package.authors].
*/
/*! # PAGEXFER

Moves raw binary data between host files and the banked memory of an emulated 8-bit
computer with a 16k ROM0 page followed by up to 32 pages of 16k RAM.

* [address] translates between a linear (BASIC) address and a page number and offset.
* [memory] provides the [memory::PagedMemory] page capability and the concrete [memory::SamMemory].
* `formats` (feature `formats`) streams files in and out of the memory pages.

The dialog layer with the session state lives in the `pagexfer-utils` crate.
*/
pub mod memory;

pub use pagexfer_core::address;

#[cfg(feature = "formats")]
pub use pagexfer_formats as formats;
