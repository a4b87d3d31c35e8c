/*
    Copyright (C) 2024  The PAGEXFER authors

    This file is part of PAGEXFER, a Rust library for moving raw binary data
    in and out of the banked memory of an emulated 8-bit computer.

    For the full copyright notice, see the lib.rs file.
*/
/*! The import and export dialog logic, free of any widgets.

```text
 Idle -> AddressEntry -> TransferInFlight -> Success  (dialog closes) -- close() --> Idle
              ^                           \-> Aborted  (dialog stays open)
              |                                  |      \-- close() --> Idle
              \------------- edit ---------------/
```

A front-end opens a [TransferDialog] on the application's [TransferSession], forwards
the user's edits and calls [TransferDialog::confirm] when the user presses OK.
[TransferDialog::close] acknowledges the outcome and returns the dialog to
[DialogState::Idle]; the session keeps the parameters for the next [TransferDialog::open],
which always starts in [DialogState::AddressEntry].
*/
use core::fmt;
use std::path::PathBuf;

#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};

use pagexfer::address::AddressMode;
use pagexfer::memory::PagedMemory;
use pagexfer::formats::binary::{import_file, export_file, Direction, TransferError};

use crate::session::TransferSession;
use crate::status::StatusSink;

/// The state of a [TransferDialog].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogState {
    /// The dialog is closed.
    Idle,
    /// The user is editing the file name, the address or the page and offset.
    AddressEntry,
    /// The file is open and the data is being transferred.
    TransferInFlight,
    /// The transfer has completed and the dialog closed, waiting for [TransferDialog::close].
    Success(TransferReport),
    /// The transfer has failed with the contained message. The dialog is still open.
    Aborted(String)
}

/// The outcome of a successful transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferReport {
    pub direction: Direction,
    /// The number of bytes transferred.
    pub bytes: usize,
    /// The linear address the transfer started at.
    pub address: u32
}

#[derive(Debug)]
pub enum DialogError {
    /// The dialog has already been closed.
    Closed,
    /// An export only confirmation was requested from a dialog of the contained direction.
    WrongDirection(Direction),
    Transfer(TransferError)
}

/// The values displayed by the dialog fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DialogFields {
    pub address: u32,
    pub page: u8,
    pub offset: u16,
    /// Present in the export dialog only.
    pub length: Option<u32>,
    pub mode: AddressMode,
    pub address_enabled: bool,
    pub page_offset_enabled: bool
}

/// An import or export dialog operating on the shared [TransferSession].
#[derive(Debug)]
pub struct TransferDialog<'s> {
    direction: Direction,
    session: &'s mut TransferSession,
    state: DialogState
}

impl fmt::Display for TransferReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.direction.status(self.bytes, self.address))
    }
}

impl std::error::Error for DialogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DialogError::Transfer(err) => Some(err),
            DialogError::Closed|
            DialogError::WrongDirection(..) => None
        }
    }
}

impl fmt::Display for DialogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogError::Closed => f.write_str("The dialog is closed"),
            DialogError::WrongDirection(direction) => {
                write!(f, "The {} dialog can't run on read-only memory", direction)
            }
            DialogError::Transfer(err) => err.fmt(f)
        }
    }
}

impl From<TransferError> for DialogError {
    fn from(err: TransferError) -> Self {
        DialogError::Transfer(err)
    }
}

impl<'s> TransferDialog<'s> {
    /// Opens a dialog pre-filled from the `session`.
    pub fn open(direction: Direction, session: &'s mut TransferSession) -> Self {
        debug!("{} dialog: {:?}", direction, session);
        TransferDialog { direction, session, state: DialogState::AddressEntry }
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn state(&self) -> &DialogState {
        &self.state
    }

    #[inline]
    pub fn session(&self) -> &TransferSession {
        &*self.session
    }
    /// Returns `true` unless the dialog has been closed or has completed a transfer.
    pub fn is_open(&self) -> bool {
        match self.state {
            DialogState::AddressEntry|
            DialogState::TransferInFlight|
            DialogState::Aborted(..) => true,
            DialogState::Idle|
            DialogState::Success(..) => false
        }
    }

    pub fn fields(&self) -> DialogFields {
        let at = self.session.at;
        let mode = self.session.mode;
        DialogFields {
            address: at.address(),
            page: at.page(),
            offset: at.offset(),
            length: match self.direction {
                Direction::Import => None,
                Direction::Export => Some(self.session.length)
            },
            mode,
            address_enabled: mode.address_enabled(),
            page_offset_enabled: mode.page_offset_enabled()
        }
    }

    pub fn set_path<P: Into<PathBuf>>(&mut self, path: P) -> bool {
        if !self.begin_edit() {
            return false
        }
        self.session.path = path.into();
        true
    }
    /// Selects which fields accept edits.
    pub fn set_mode(&mut self, mode: AddressMode) -> bool {
        if !self.begin_edit() {
            return false
        }
        self.session.mode = mode;
        true
    }
    /// Returns `false` and ignores the value if the address field is disabled.
    pub fn set_address(&mut self, address: u32) -> bool {
        if !self.session.mode.address_enabled() || !self.begin_edit() {
            return false
        }
        self.session.at = self.session.at.with_address(address);
        true
    }
    /// Returns `false` and ignores the value if the page field is disabled.
    pub fn set_page(&mut self, page: u32) -> bool {
        if !self.session.mode.page_offset_enabled() || !self.begin_edit() {
            return false
        }
        self.session.at = self.session.at.with_page(page);
        true
    }
    /// Returns `false` and ignores the value if the offset field is disabled.
    pub fn set_offset(&mut self, offset: u32) -> bool {
        if !self.session.mode.page_offset_enabled() || !self.begin_edit() {
            return false
        }
        self.session.at = self.session.at.with_offset(offset);
        true
    }
    /// Returns `false` and ignores the value in the import dialog.
    pub fn set_length(&mut self, length: u32) -> bool {
        if self.direction != Direction::Export || !self.begin_edit() {
            return false
        }
        self.session.length = length;
        true
    }
    /// Runs the transfer with the current parameters.
    ///
    /// On success the status is posted to `status` and the dialog closes. On failure the
    /// dialog stays open so the parameters can be corrected. In both cases the outcome
    /// remains in [TransferDialog::state] until [TransferDialog::close] is called.
    ///
    /// An export dialog only reads from `mem`; see [TransferDialog::confirm_export] for
    /// exporting from memory that is borrowed immutably.
    ///
    /// # Errors
    /// [DialogError::Closed] if the dialog is no longer open or [DialogError::Transfer]
    /// with the cause of the failed transfer.
    pub fn confirm<M, S>(&mut self, mem: &mut M, status: S) -> Result<TransferReport, DialogError>
        where M: PagedMemory, S: StatusSink
    {
        if self.direction == Direction::Export {
            return self.confirm_export(mem, status)
        }
        if !self.is_open() {
            return Err(DialogError::Closed)
        }
        self.state = DialogState::TransferInFlight;
        let res = import_file(mem, &self.session.path, self.session.at);
        self.complete(res, status)
    }
    /// Runs the export with the current parameters, reading from `mem`.
    ///
    /// # Errors
    /// [DialogError::WrongDirection] if this is an import dialog, otherwise the same as
    /// [TransferDialog::confirm].
    pub fn confirm_export<M, S>(&mut self, mem: &M, status: S) -> Result<TransferReport, DialogError>
        where M: PagedMemory, S: StatusSink
    {
        if self.direction != Direction::Export {
            return Err(DialogError::WrongDirection(self.direction))
        }
        if !self.is_open() {
            return Err(DialogError::Closed)
        }
        self.state = DialogState::TransferInFlight;
        let res = export_file(mem, &self.session.path, self.session.at, self.session.length as usize);
        self.complete(res, status)
    }
    /// Closes the dialog without a transfer or acknowledges the outcome of the last one.
    pub fn close(&mut self) {
        self.state = DialogState::Idle;
    }

    fn complete<S: StatusSink>(
            &mut self,
            res: Result<usize, TransferError>,
            mut status: S
        ) -> Result<TransferReport, DialogError>
    {
        match res {
            Ok(bytes) => {
                let report = TransferReport {
                    direction: self.direction,
                    bytes,
                    address: self.session.at.address()
                };
                status.set_status(format_args!("{}", report));
                self.state = DialogState::Success(report);
                Ok(report)
            }
            Err(err) => {
                warn!("{} dialog: {}", self.direction, err);
                self.state = DialogState::Aborted(err.to_string());
                Err(err.into())
            }
        }
    }

    fn begin_edit(&mut self) -> bool {
        match self.state {
            DialogState::AddressEntry => true,
            DialogState::Aborted(..) => {
                self.state = DialogState::AddressEntry;
                true
            }
            _ => false
        }
    }
}
