/*
    pagexfer-cli: Binary import and export for memory images.
    Copyright (C) 2024  The PAGEXFER authors

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/
use core::fmt;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};

use clap::{clap_app, crate_version, ArgMatches};

use pagexfer::address::{AddressMode, AddressTriple};
use pagexfer::memory::{PagedMemory, SamMemory};
use pagexfer::formats::binary::Direction;
use pagexfer_utils::dialog::TransferDialog;
use pagexfer_utils::session::TransferSession;
use pagexfer_utils::status::StatusSink;

type Result<T> = core::result::Result<T, Box<dyn Error>>;

/// Prints the status line to the standard output.
struct Console;

impl StatusSink for Console {
    fn set_status(&mut self, args: fmt::Arguments<'_>) {
        println!("{}", args);
    }
}

fn main() -> Result<()> {
    let matches = clap_app!(pagexfer =>
        (version: crate_version!())
        (about: "Imports and exports raw binary data to and from a 512k RAM image")
        (@arg verbose: -v --verbose ... "Increases logging verbosity")
        (@arg rom: -r --rom +takes_value "A 16k ROM0 image to load, saved back after an import into ROM0")
        (@arg IMAGE: +required "The RAM image file, created when missing")
        (@subcommand import =>
            (about: "Reads a file into memory and saves the RAM image")
            (@arg FILE: +required "The file to import")
            (@arg addr: -a --addr +takes_value conflicts_with[page offset] "BASIC address")
            (@arg page: -p --page +takes_value "Page number")
            (@arg offset: -o --offset +takes_value "Page offset")
        )
        (@subcommand export =>
            (about: "Writes a block of memory into a file")
            (@arg FILE: +required "The file to export to")
            (@arg addr: -a --addr +takes_value conflicts_with[page offset] "BASIC address")
            (@arg page: -p --page +takes_value "Page number")
            (@arg offset: -o --offset +takes_value "Page offset")
            (@arg len: -l --len +takes_value "The number of bytes to export")
        )
    ).get_matches();

    let level = match matches.occurrences_of("verbose") {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let (direction, sub) = match matches.subcommand() {
        ("import", Some(sub)) => (Direction::Import, sub),
        ("export", Some(sub)) => (Direction::Export, sub),
        _ => {
            eprintln!("{}", matches.usage());
            return Ok(())
        }
    };

    let image = Path::new(matches.value_of_os("IMAGE").ok_or("IMAGE is required")?);
    let rom = matches.value_of_os("rom").map(Path::new);
    let mut mem = SamMemory::default();
    load_image(&mut mem, image)?;
    if let Some(rom) = rom {
        debug!("loading ROM0: {}", rom.display());
        mem.load_into_rom(BufReader::new(File::open(rom)?))?;
    }

    let mut session = TransferSession::default();
    {
        let mut dialog = TransferDialog::open(direction, &mut session);
        configure(&mut dialog, sub)?;
        debug!("{:?}", dialog.fields());
        match direction {
            Direction::Import => {
                check_rom_target(dialog.session().at, rom)?;
                dialog.confirm(&mut mem, Console)?;
            }
            Direction::Export => {
                dialog.confirm_export(&mem, Console)?;
            }
        }
        dialog.close();
    }

    if direction == Direction::Import {
        save_images(&mem, image, rom, session.at)?;
    }
    Ok(())
}

fn configure(dialog: &mut TransferDialog<'_>, sub: &ArgMatches<'_>) -> Result<()> {
    if let Some(file) = sub.value_of_os("FILE") {
        dialog.set_path(file);
    }
    if let Some(addr) = sub.value_of("addr") {
        dialog.set_mode(AddressMode::Basic);
        dialog.set_address(parse_num(addr)?);
    }
    else if sub.is_present("page") || sub.is_present("offset") {
        dialog.set_mode(AddressMode::PageOffset);
        if let Some(page) = sub.value_of("page") {
            dialog.set_page(parse_num(page)?);
        }
        dialog.set_offset(sub.value_of("offset").map(parse_num).transpose()?.unwrap_or(0));
    }
    if let Some(len) = sub.value_of("len") {
        dialog.set_length(parse_num(len)?);
    }
    Ok(())
}

fn load_image(mem: &mut SamMemory, path: &Path) -> Result<()> {
    match File::open(path) {
        Ok(file) => {
            debug!("loading RAM image: {}", path.display());
            mem.load_into_ram(BufReader::new(file))?;
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            info!("{} not found, starting with empty memory", path.display());
        }
        Err(err) => return Err(err.into())
    }
    Ok(())
}

/// An import starting below the first RAM page writes into ROM0, which only persists
/// through the `--rom` image.
fn check_rom_target(at: AddressTriple, rom: Option<&Path>) -> Result<()> {
    if at.slot().is_rom() && rom.is_none() {
        return Err(format!("importing to {} writes into ROM0, a --rom image is required", at).into())
    }
    Ok(())
}

/// Saves the RAM image and, if the import started in ROM0, the ROM0 image.
fn save_images(mem: &SamMemory, image: &Path, rom: Option<&Path>, at: AddressTriple) -> Result<()> {
    debug!("saving RAM image: {}", image.display());
    let mut wr = BufWriter::new(File::create(image)?);
    mem.save_ram(&mut wr)?;
    wr.flush()?;
    if let (true, Some(rom)) = (at.slot().is_rom(), rom) {
        debug!("saving ROM0: {}", rom.display());
        let mut wr = BufWriter::new(File::create(rom)?);
        mem.save_rom(&mut wr)?;
        wr.flush()?;
    }
    Ok(())
}

/// Parses a decimal or a `0x` or `$` prefixed hexadecimal number.
fn parse_num(s: &str) -> core::result::Result<u32, String> {
    let s = s.trim();
    let res = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
                                  .or_else(|| s.strip_prefix('$')) {
        u32::from_str_radix(hex, 16)
    }
    else {
        s.parse()
    };
    res.map_err(|e| format!("invalid number {:?}: {}", s, e))
}
