//! Owning ROM facade.
//!
//! Owns the loaded image bytes and answers the questions the front end
//! asks: title, checksum state, embedded strings. Everything reads
//! through borrowed views; the single write path is checksum repair,
//! which patches the two global-checksum bytes in place.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::addr::Addr;
use crate::header::{Header, HEADER_END};
use crate::strings::{self, ScanRules};
use crate::text;
use crate::view::View;

/// Why a ROM could not be used.
#[derive(Debug)]
pub enum RomError {
    /// The image ends before the cartridge header does.
    TooSmall(usize),
    Io(std::io::Error),
}

impl fmt::Display for RomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall(size) => write!(
                f,
                "ROM too small: {} bytes (need at least {:#x} for the header)",
                size,
                HEADER_END + 1,
            ),
            Self::Io(e) => write!(f, "ROM I/O error: {e}"),
        }
    }
}

impl std::error::Error for RomError {}

impl From<std::io::Error> for RomError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// A loaded cartridge ROM image.
pub struct Rom {
    image: Vec<u8>,
}

impl Rom {
    /// Take ownership of an image.
    ///
    /// # Errors
    ///
    /// Rejects images too small to contain the cartridge header.
    pub fn from_bytes(image: Vec<u8>) -> Result<Self, RomError> {
        if image.len() <= HEADER_END {
            return Err(RomError::TooSmall(image.len()));
        }
        Ok(Self { image })
    }

    /// Read a ROM file into memory.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures and rejects undersized images.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RomError> {
        Self::from_bytes(fs::read(path)?)
    }

    /// Write the image back to a file.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RomError> {
        fs::write(path, &self.image)?;
        Ok(())
    }

    /// The raw image bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.image
    }

    /// A view over the whole image.
    #[must_use]
    pub fn view(&self) -> View<'_> {
        View::new(&self.image)
    }

    /// The parsed cartridge header.
    #[must_use]
    pub fn header(&self) -> Header<'_> {
        Header::new(&self.view())
    }

    /// The cartridge title: the non-zero bytes of $0134-$0143 read as
    /// raw characters, or `"(NOT SET)"` when all of them are zero.
    #[must_use]
    pub fn title(&self) -> String {
        let title: String = self.image[0x134..=0x143]
            .iter()
            .filter(|&&b| b != 0)
            .map(|&b| char::from(b))
            .collect();
        if title.is_empty() {
            "(NOT SET)".to_string()
        } else {
            title
        }
    }

    /// The recomputed global checksum.
    #[must_use]
    pub fn global_checksum(&self) -> u16 {
        self.header().computed_global_checksum()
    }

    /// The global checksum as stored in the header.
    #[must_use]
    pub fn stored_checksum(&self) -> u16 {
        self.header().stored_global_checksum()
    }

    /// Whether the stored global checksum matches the image.
    #[must_use]
    pub fn checksum_ok(&self) -> bool {
        self.global_checksum() == self.stored_checksum()
    }

    /// Recompute the global checksum and write it into the header,
    /// big-endian. The only mutation this crate performs. Returns the
    /// post-repair [`checksum_ok`](Rom::checksum_ok).
    pub fn fix_checksum(&mut self) -> bool {
        let field = {
            let header = self.header();
            let view = header.global_checksum_field();
            (view.start_addr().to_linear(), view.end_addr().to_linear())
        };
        let sum = self.global_checksum();
        self.image[field.0] = (sum >> 8) as u8;
        self.image[field.1] = (sum & 0xff) as u8;
        self.checksum_ok()
    }

    /// Decode the text between two addresses (inclusive) with the
    /// Generation-I codec.
    #[must_use]
    pub fn string_at(&self, start: Addr, end: Addr) -> String {
        text::decode(self.view().from(start).to(end).iter())
    }

    /// Scan the whole image for embedded strings, with the default
    /// acceptance rules.
    #[must_use]
    pub fn strings(&self) -> BTreeMap<Addr, String> {
        self.strings_with(ScanRules::default())
    }

    /// Scan the whole image for embedded strings.
    #[must_use]
    pub fn strings_with(&self, rules: ScanRules) -> BTreeMap<Addr, String> {
        strings::strings(&self.view(), rules)
    }
}
