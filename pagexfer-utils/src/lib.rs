/*
    Copyright (C) 2024  The PAGEXFER authors

    This file is part of PAGEXFER, a Rust library for moving raw binary data
    in and out of the banked memory of an emulated 8-bit computer.

    For the full copyright notice, see the lib.rs file.
*/
//! Dialog layer helpers for front-ends based on PAGEXFER.
pub mod dialog;
pub mod session;
pub mod status;
