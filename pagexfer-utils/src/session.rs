/*
    Copyright (C) 2024  The PAGEXFER authors

    This file is part of PAGEXFER, a Rust library for moving raw binary data
    in and out of the banked memory of an emulated 8-bit computer.

    For the full copyright notice, see the lib.rs file.
*/
//! The last used transfer parameters.
use std::path::PathBuf;

#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

use pagexfer::address::{AddressTriple, AddressMode};

/// The export length shown when no other length has been entered yet.
pub const DEFAULT_EXPORT_LENGTH: u32 = 16384;

/// Transfer parameters retained between dialogs for the lifetime of the application.
///
/// The address, page, offset and address mode are shared between the import and
/// export dialogs. Nothing here is written to disk by this crate.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "snapshot", serde(default))]
pub struct TransferSession {
    /// The last used host file.
    pub path: PathBuf,
    /// The last used address, page and offset.
    pub at: AddressTriple,
    /// Whether the address or the page and offset were the authoritative input.
    pub mode: AddressMode,
    /// The last used export length.
    pub length: u32
}

impl Default for TransferSession {
    fn default() -> Self {
        TransferSession {
            path: PathBuf::new(),
            at: AddressTriple::default(),
            mode: AddressMode::default(),
            length: DEFAULT_EXPORT_LENGTH
        }
    }
}
