/*
    Copyright (C) 2024  The PAGEXFER authors

    This file is part of PAGEXFER, a Rust library for moving raw binary data
    in and out of the banked memory of an emulated 8-bit computer.

    For the full copyright notice, see the lib.rs file.
*/
/*! Raw binary import and export.

Data is streamed directly between a host file and the physical memory pages, starting
at the page and offset resolved from an [AddressTriple]:

```text
 address:  0x0000     0x4000     0x8000            0x80000    0x84000
           | ROM0     | page 0   | page 1   . . .  | page 31  |
```

A transfer is split into chunks that never cross a page boundary. After each chunk
the offset resets to 0 and the page index advances by one, wrapping to page 0 once
it reaches the size of the physical page table. A transfer starting in ROM0 continues
in page 0.
*/
use core::fmt;
use core::ops::Range;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};

use pagexfer_core::address::AddressTriple;
use pagexfer_core::memory::{PagedMemory, PageSlot, MemoryError, PAGE_SIZE, MEMORY_SIZE};
use crate::ReadExactEx;

/// The maximum number of bytes a single import may read.
pub const IMPORT_LIMIT: usize = 0x7FFFF;
/// The maximum number of bytes a single export may write.
pub const EXPORT_LIMIT: usize = MEMORY_SIZE;

/// The direction of a transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From a host file into memory.
    Import,
    /// From memory into a host file.
    Export
}

#[non_exhaustive]
#[derive(Debug)]
pub enum TransferError {
    /// The source file could not be opened for reading or the destination for writing.
    FileOpen(Direction, io::Error),
    /// Reading from the source file failed for a reason other than reaching its end.
    Read(io::Error),
    /// Writing to the destination file failed, e.g. the disk is full.
    Write(io::Error),
    /// A page outside of the physical page table was requested.
    Memory(MemoryError)
}

/// A type returned by the transfer functions.
pub type Result<T> = core::result::Result<T, TransferError>;

/// A single page-bounded piece of a transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageChunk {
    pub slot: PageSlot,
    pub offset: usize,
    pub len: usize
}

/// An iterator of [PageChunk]s covering a transfer.
#[derive(Clone, Debug)]
pub struct PageChunks {
    slot: PageSlot,
    offset: usize,
    remaining: usize,
    page_size: usize,
    page_count: usize
}

impl Direction {
    fn verb(self) -> &'static str {
        match self {
            Direction::Import => "imported to",
            Direction::Export => "exported from"
        }
    }
    /// Formats the status line of a completed transfer.
    pub fn status(self, bytes: usize, address: u32) -> String {
        format!("{} bytes {} {}", bytes, self.verb(), address)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Import => "Import",
            Direction::Export => "Export"
        })
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransferError::FileOpen(_, err)|
            TransferError::Read(err)|
            TransferError::Write(err) => Some(err),
            TransferError::Memory(err) => Some(err)
        }
    }
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", match self {
            TransferError::FileOpen(Direction::Import, _) => "Failed to open file for reading",
            TransferError::FileOpen(Direction::Export, _) => "Failed to open file for writing",
            TransferError::Read(_) => "Error reading from file",
            TransferError::Write(_) => "Error writing to file (disk full?)",
            TransferError::Memory(err) => return err.fmt(f)
        })
    }
}

impl From<MemoryError> for TransferError {
    fn from(err: MemoryError) -> Self {
        TransferError::Memory(err)
    }
}

impl From<TransferError> for io::Error {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::FileOpen(_, err)|
            TransferError::Read(err)|
            TransferError::Write(err) => err,
            TransferError::Memory(err) => err.into()
        }
    }
}

impl PageChunk {
    /// Returns the range of bytes within the page slice.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }
}

impl PageChunks {
    /// Creates an iterator of chunks of `len` bytes in total starting at `offset` into the `slot`
    /// page, in a page table of `page_count` RAM pages of [PAGE_SIZE] bytes.
    pub fn new(slot: PageSlot, offset: usize, len: usize, page_count: usize) -> Self {
        PageChunks { slot, offset, remaining: len, page_size: PAGE_SIZE, page_count }
    }
    /// Creates an iterator of chunks of `len` bytes in total starting at `at`, fitted to the
    /// page table of the memory `M`.
    pub fn for_memory<M: PagedMemory>(at: AddressTriple, len: usize) -> Self {
        PageChunks {
            slot: at.slot(),
            offset: at.offset().into(),
            remaining: len,
            page_size: M::PAGE_SIZE,
            page_count: M::RAM_PAGES
        }
    }
    /// Returns the number of bytes not yet covered by the yielded chunks.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl Iterator for PageChunks {
    type Item = PageChunk;

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.remaining.min(self.page_size.saturating_sub(self.offset));
        if len == 0 {
            return None
        }
        let chunk = PageChunk { slot: self.slot, offset: self.offset, len };
        self.remaining -= len;
        self.offset = 0;
        self.slot = self.slot.next(self.page_count);
        Some(chunk)
    }
}

/// Reads data from `rd` directly into the memory pages starting at `at`.
///
/// Reading stops at the end of the source or after [IMPORT_LIMIT] bytes. A source shorter
/// than that is not an error. Returns the number of bytes imported.
///
/// There is no rollback: on error the bytes read so far stay in memory.
///
/// # Errors
/// [TransferError::Read] if reading fails and [TransferError::Memory] if the starting page
/// is not present in the page table of `mem`.
pub fn import_binary<M: PagedMemory, R: Read>(
        mem: &mut M,
        mut rd: R,
        at: AddressTriple
    ) -> Result<usize>
{
    let mut total = 0;
    for chunk in PageChunks::for_memory::<M>(at, IMPORT_LIMIT) {
        let page = mem.page_mut(chunk.slot)?;
        let read = rd.read_exact_or_to_end(&mut page[chunk.range()])
                     .map_err(TransferError::Read)?;
        trace!("import: page {} offset {:#06x} len {} read {}", chunk.slot, chunk.offset, chunk.len, read);
        total += read;
        if read < chunk.len {
            break
        }
    }
    Ok(total)
}

/// Writes `length` bytes of memory starting at `at` to `wr`.
///
/// `length` is capped at [EXPORT_LIMIT]. Returns the number of bytes exported.
///
/// # Errors
/// [TransferError::Write] if writing fails, in which case the data written so far is left
/// in `wr`, and [TransferError::Memory] if the starting page is not present in the page table.
pub fn export_binary<M: PagedMemory, W: Write>(
        mem: &M,
        mut wr: W,
        at: AddressTriple,
        length: usize
    ) -> Result<usize>
{
    let mut total = 0;
    for chunk in PageChunks::for_memory::<M>(at, length.min(EXPORT_LIMIT)) {
        let page = mem.page_ref(chunk.slot)?;
        wr.write_all(&page[chunk.range()]).map_err(TransferError::Write)?;
        trace!("export: page {} offset {:#06x} len {}", chunk.slot, chunk.offset, chunk.len);
        total += chunk.len;
    }
    Ok(total)
}

/// Opens the file at `path` and imports its content with [import_binary].
///
/// # Errors
/// [TransferError::FileOpen] if `path` is empty or the file can't be opened; memory is not
/// modified in this instance. Otherwise errors of [import_binary].
pub fn import_file<M: PagedMemory, P: AsRef<Path>>(
        mem: &mut M,
        path: P,
        at: AddressTriple
    ) -> Result<usize>
{
    let path = path.as_ref();
    let file = open_file(Direction::Import, path)?;
    debug!("importing {} to {}", path.display(), at);
    let read = import_binary(mem, io::BufReader::new(file), at)
               .map_err(|err| log_abort(Direction::Import, path, err))?;
    info!("{}", Direction::Import.status(read, at.address()));
    Ok(read)
}

/// Creates the file at `path` and exports `length` bytes of memory into it with [export_binary].
///
/// # Errors
/// [TransferError::FileOpen] if `path` is empty or the file can't be created; nothing is
/// written in this instance. Otherwise errors of [export_binary]; a partially written file
/// is left on disk.
pub fn export_file<M: PagedMemory, P: AsRef<Path>>(
        mem: &M,
        path: P,
        at: AddressTriple,
        length: usize
    ) -> Result<usize>
{
    let path = path.as_ref();
    let file = open_file(Direction::Export, path)?;
    debug!("exporting {} bytes from {} to {}", length, at, path.display());
    let mut wr = io::BufWriter::new(file);
    let written = export_binary(mem, &mut wr, at, length)
                  .and_then(|written| {
                      wr.flush().map_err(TransferError::Write)?;
                      Ok(written)
                  })
                  .map_err(|err| log_abort(Direction::Export, path, err))?;
    info!("{}", Direction::Export.status(written, at.address()));
    Ok(written)
}

fn open_file(direction: Direction, path: &Path) -> Result<File> {
    if path.as_os_str().is_empty() {
        return Err(TransferError::FileOpen(direction,
                    io::Error::new(io::ErrorKind::InvalidInput, "no file name given")))
    }
    match direction {
        Direction::Import => File::open(path),
        Direction::Export => File::create(path)
    }
    .map_err(|err| {
        warn!("{} {}: {}", direction, path.display(), err);
        TransferError::FileOpen(direction, err)
    })
}

fn log_abort(direction: Direction, path: &Path, err: TransferError) -> TransferError {
    warn!("{} {} aborted: {}", direction, path.display(), err);
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use pagexfer::memory::SamMemory;
    use pagexfer_core::memory::N_PAGES_MAIN;

    /// Accepts `limit` bytes, then fails.
    struct FullDisk {
        data: Vec<u8>,
        limit: usize
    }

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.limit - self.data.len();
            if room == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "no space left on device"))
            }
            let len = buf.len().min(room);
            self.data.extend_from_slice(&buf[..len]);
            Ok(len)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "device not ready"))
        }
    }

    fn chunks(slot: PageSlot, offset: usize, len: usize) -> Vec<(PageSlot, usize, usize)> {
        PageChunks::new(slot, offset, len, N_PAGES_MAIN)
                   .map(|PageChunk { slot, offset, len }| (slot, offset, len))
                   .collect()
    }

    #[test]
    fn page_chunks_split_at_page_boundaries() {
        assert_eq!(chunks(PageSlot::Ram(0), 0, 5), [(PageSlot::Ram(0), 0, 5)]);
        assert_eq!(chunks(PageSlot::Ram(3), 0x3FF0, 0x4000 + 10), [
            (PageSlot::Ram(3), 0x3FF0, 16),
            (PageSlot::Ram(4), 0, 0x4000 - 6)
        ]);
        assert_eq!(chunks(PageSlot::Ram(30), 0x2000, 0x8000), [
            (PageSlot::Ram(30), 0x2000, 0x2000),
            (PageSlot::Ram(31), 0, 0x4000),
            (PageSlot::Ram(0), 0, 0x2000)
        ]);
        assert_eq!(chunks(PageSlot::Rom, 0x3FFF, 3), [
            (PageSlot::Rom, 0x3FFF, 1),
            (PageSlot::Ram(0), 0, 2)
        ]);
        assert!(chunks(PageSlot::Ram(1), 0, 0).is_empty());
        assert!(chunks(PageSlot::Ram(1), 0x4000, 100).is_empty());
        let mut iter = PageChunks::new(PageSlot::Ram(0), 0, 0x4001, N_PAGES_MAIN);
        assert!(iter.next().is_some());
        assert_eq!(iter.remaining(), 1);
    }

    #[test]
    fn page_chunks_cover_whole_memory() {
        let all = chunks(PageSlot::Rom, 0, EXPORT_LIMIT);
        assert_eq!(all.len(), N_PAGES_MAIN + 1);
        assert_eq!(all[0], (PageSlot::Rom, 0, PAGE_SIZE));
        for (index, &(slot, offset, len)) in all[1..].iter().enumerate() {
            assert_eq!((slot, offset, len), (PageSlot::Ram(index as u8), 0, PAGE_SIZE));
        }
    }

    #[test]
    fn page_chunks_random_splits() {
        let mut rng = SmallRng::seed_from_u64(0x5A3);
        for _ in 0..2000 {
            let page: u8 = rng.gen_range(0..N_PAGES_MAIN as u8);
            let offset = rng.gen_range(0..PAGE_SIZE);
            let len = rng.gen_range(0..=EXPORT_LIMIT);
            let all = chunks(PageSlot::Ram(page), offset, len);
            assert_eq!(all.iter().map(|c| c.2).sum::<usize>(), len);
            let mut expected_slot = PageSlot::Ram(page);
            let mut start = offset;
            for &(slot, chunk_offset, chunk_len) in all.iter() {
                assert_eq!(slot, expected_slot);
                assert_eq!(chunk_offset, start);
                assert!(chunk_len > 0);
                assert!(chunk_len <= PAGE_SIZE - chunk_offset);
                expected_slot = expected_slot.next(N_PAGES_MAIN);
                start = 0;
            }
        }
    }

    #[test]
    fn import_binary_works() {
        let mut mem = SamMemory::default();
        let at = AddressTriple::from_address(0x4000);
        assert_eq!(import_binary(&mut mem, &[1u8,2,3,4,5][..], at).unwrap(), 5);
        assert_eq!(&mem.page_ref(PageSlot::Ram(0)).unwrap()[..6], &[1,2,3,4,5,0]);
        assert_eq!(Direction::Import.status(5, at.address()), "5 bytes imported to 16384");

        let data: Vec<u8> = (0..40u8).collect();
        let at = AddressTriple::from_page_offset(31, 0x3FEC);
        assert_eq!(import_binary(&mut mem, &data[..], at).unwrap(), 40);
        assert_eq!(&mem.page_ref(PageSlot::Ram(31)).unwrap()[0x3FEC..], &data[..20]);
        // the last page is followed by page 0, not ROM0
        assert_eq!(&mem.page_ref(PageSlot::Ram(0)).unwrap()[..20], &data[20..]);
        assert_eq!(mem.page_ref(PageSlot::Ram(0)).unwrap()[20], 0);
        assert_eq!(&mem.page_ref(PageSlot::Rom).unwrap()[..20], &[0u8;20][..]);

        let at = AddressTriple::from_address(0x3FFE);
        assert_eq!(import_binary(&mut mem, &[7u8,8,9][..], at).unwrap(), 3);
        assert_eq!(&mem.page_ref(PageSlot::Rom).unwrap()[0x3FFE..], &[7,8]);
        assert_eq!(mem.page_ref(PageSlot::Ram(0)).unwrap()[0], 9);

        assert_eq!(import_binary(&mut mem, io::empty(), at).unwrap(), 0);
    }

    #[test]
    fn import_binary_caps_length() {
        let mut mem = SamMemory::default();
        let at = AddressTriple::from_address(0x4000);
        let read = import_binary(&mut mem, io::repeat(0xAA).take(0x90000), at).unwrap();
        assert_eq!(read, IMPORT_LIMIT);
        // the last byte of the last page stays untouched
        assert_eq!(mem.page_ref(PageSlot::Ram(31)).unwrap()[PAGE_SIZE - 2], 0xAA);
        assert_eq!(mem.page_ref(PageSlot::Ram(31)).unwrap()[PAGE_SIZE - 1], 0);
        assert_eq!(mem.page_ref(PageSlot::Rom).unwrap()[0], 0);
    }

    #[test]
    fn import_binary_read_error() {
        let mut mem = SamMemory::default();
        match import_binary(&mut mem, Broken, AddressTriple::default()) {
            Err(TransferError::Read(err)) => assert_eq!(err.kind(), io::ErrorKind::Other),
            _ => panic!("read error expected")
        }
    }

    #[test]
    fn export_binary_works() {
        let mut mem = SamMemory::default();
        let mut rng = SmallRng::seed_from_u64(7);
        mem.fill_ram(|| rng.gen()).unwrap();
        let at = AddressTriple::from_page_offset(5, 0x3FF0);
        let mut out = Vec::new();
        assert_eq!(export_binary(&mem, &mut out, at, 0x4000 + 10).unwrap(), 0x400A);
        assert_eq!(&out[..16], &mem.page_ref(PageSlot::Ram(5)).unwrap()[0x3FF0..]);
        assert_eq!(&out[16..], &mem.page_ref(PageSlot::Ram(6)).unwrap()[..0x3FFA]);

        let mut out = Vec::new();
        assert_eq!(export_binary(&mem, &mut out, AddressTriple::from_address(0), 0x100000).unwrap(),
                   EXPORT_LIMIT);
        assert_eq!(out.len(), EXPORT_LIMIT);
        assert_eq!(&out[PAGE_SIZE..2*PAGE_SIZE], mem.page_ref(PageSlot::Ram(0)).unwrap());

        let mut out = Vec::new();
        assert_eq!(export_binary(&mem, &mut out, at, 0).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn export_binary_write_error() {
        let mem = SamMemory::default();
        let mut disk = FullDisk { data: Vec::new(), limit: 100 };
        match export_binary(&mem, &mut disk, AddressTriple::default(), 1000) {
            Err(err@TransferError::Write(..)) => {
                assert_eq!(format!("{}", err), "Error writing to file (disk full?)");
            }
            _ => panic!("write error expected")
        }
        assert_eq!(disk.data.len(), 100);
    }

    #[test]
    fn transfer_error_works() {
        let err = TransferError::FileOpen(Direction::Import, io::ErrorKind::NotFound.into());
        assert_eq!(format!("{}", err), "Failed to open file for reading");
        assert!(std::error::Error::source(&err).is_some());
        let err: io::Error = err.into();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        let err = TransferError::FileOpen(Direction::Export, io::ErrorKind::PermissionDenied.into());
        assert_eq!(format!("{}", err), "Failed to open file for writing");
        let err: TransferError = MemoryError::InvalidPageIndex.into();
        assert_eq!(format!("{}", err), "Memory page index is out of range");
        assert_eq!(Direction::Export.status(10, 0), "10 bytes exported from 0");
    }

    #[test]
    fn import_file_missing_leaves_memory() {
        let mut mem = SamMemory::default();
        let mut rng = SmallRng::seed_from_u64(99);
        mem.fill_ram(|| rng.gen()).unwrap();
        let sum = mem.checksum().unwrap();
        let path = std::env::temp_dir().join("pagexfer-formats-missing-file.bin");
        let _ = std::fs::remove_file(&path);
        match import_file(&mut mem, &path, AddressTriple::default()) {
            Err(TransferError::FileOpen(Direction::Import, err)) => {
                assert_eq!(err.kind(), io::ErrorKind::NotFound)
            }
            _ => panic!("file open error expected")
        }
        match import_file(&mut mem, "", AddressTriple::default()) {
            Err(TransferError::FileOpen(Direction::Import, err)) => {
                assert_eq!(err.kind(), io::ErrorKind::InvalidInput)
            }
            _ => panic!("file open error expected")
        }
        assert!(matches!(export_file(&mem, "", AddressTriple::default(), 10),
                         Err(TransferError::FileOpen(Direction::Export, _))));
        assert_eq!(mem.checksum().unwrap(), sum);
    }

    #[test]
    fn file_transfer_works() {
        let mut mem = SamMemory::default();
        let path = std::env::temp_dir().join(format!("pagexfer-formats-{}.bin", std::process::id()));
        let data: Vec<u8> = (0..=255u8).cycle().take(PAGE_SIZE + 300).collect();
        std::fs::write(&path, &data).unwrap();
        let at = AddressTriple::from_page_offset(9, 0x100);
        assert_eq!(import_file(&mut mem, &path, at).unwrap(), data.len());
        assert_eq!(export_file(&mem, &path, at, data.len() + 4).unwrap(), data.len() + 4);
        let out = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(&out[..data.len()], &data[..]);
        assert_eq!(&out[data.len()..], &[0,0,0,0]);
    }
}
