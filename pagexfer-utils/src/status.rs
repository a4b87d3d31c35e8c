/*
    Copyright (C) 2024  The PAGEXFER authors

    This file is part of PAGEXFER, a Rust library for moving raw binary data
    in and out of the banked memory of an emulated 8-bit computer.

    For the full copyright notice, see the lib.rs file.
*/
//! User visible status line.
use core::fmt;

use log::info;

/// A destination of the formatted, user visible status messages.
///
/// Posting a status is fire-and-forget.
pub trait StatusSink {
    fn set_status(&mut self, args: fmt::Arguments<'_>);
}

/// Posts the status messages to the log at the `info` level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogStatus;

impl StatusSink for LogStatus {
    fn set_status(&mut self, args: fmt::Arguments<'_>) {
        info!("{}", args);
    }
}

/// Collects status messages, the last one being the current status line.
impl StatusSink for Vec<String> {
    fn set_status(&mut self, args: fmt::Arguments<'_>) {
        self.push(args.to_string());
    }
}

impl<S: StatusSink + ?Sized> StatusSink for &mut S {
    #[inline]
    fn set_status(&mut self, args: fmt::Arguments<'_>) {
        (**self).set_status(args)
    }
}
