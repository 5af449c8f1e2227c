//! Bounds-checked, type-annotated windows over a ROM image.
//!
//! A `View` is an inclusive `[start, end]` window over a borrowed byte
//! buffer, with a read cursor and optional annotations describing what
//! the bytes are expected to be. Views are cheap values: every
//! derivation (`from`, `to`, `length`, ...) returns a new view over the
//! same buffer, which makes field layouts read as a chain of range
//! refinements.
//!
//! Reads through a view never fault. A read that would land outside the
//! readable range yields 0 instead, so a linear scan can probe
//! arbitrary offsets of a ROM that is known to contain malformed or
//! speculative regions. Structural checks are the `is_valid` boolean;
//! nothing here panics on bad data.

use crate::addr::{banks_in, Addr, BANK_SIZE};

/// Declared data type of a view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// A single byte holding a ROM bank index.
    RomBank,
    /// A word holding an offset into the mapped ROM address space.
    RomOffset,
    /// Executable code, unconstrained length.
    Code,
    /// Exactly one byte.
    Byte,
    /// A run of bytes.
    Bytes,
    /// Exactly one 16-bit word.
    Word,
    /// A run of words.
    Words,
    /// Encoded text.
    Text,
}

/// Byte order of multi-byte values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Label attached to hull views (see [`View::hull`]).
pub const HULL_LABEL: &str = "__transitive_hull";

/// Optional annotations carried by a view: declared type, declared byte
/// order, and a label for external dumps. Each field is independently
/// present or absent, so a `Note` doubles as a patch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Note {
    pub kind: Option<Kind>,
    pub endian: Option<Endian>,
    pub label: Option<&'static str>,
}

impl Note {
    #[must_use]
    pub fn kind(kind: Kind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn endian(endian: Endian) -> Self {
        Self {
            endian: Some(endian),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn label(label: &'static str) -> Self {
        Self {
            label: Some(label),
            ..Self::default()
        }
    }

    /// Merge field-by-field; fields set in `patch` win, the rest keep
    /// the base value.
    #[must_use]
    pub fn merge(self, patch: Note) -> Note {
        Note {
            kind: patch.kind.or(self.kind),
            endian: patch.endian.or(self.endian),
            label: patch.label.or(self.label),
        }
    }
}

/// A record type that can be parsed out of a view, for use with
/// [`View::repeated`].
pub trait Record<'a>: Sized {
    /// Parse a record starting at the view's start.
    fn from_view(view: View<'a>) -> Self;
    /// Byte length of the record; 0 ends a repeated parse.
    fn byte_len(&self) -> usize;
    /// Whether the record parsed cleanly.
    fn is_valid(&self) -> bool;
}

/// An immutable `[start, end]` window over a byte buffer, with a read
/// cursor and a [`Note`].
#[derive(Clone, Copy, Debug)]
pub struct View<'a> {
    data: &'a [u8],
    start: Addr,
    end: Addr,
    cursor: Addr,
    note: Note,
}

impl<'a> View<'a> {
    /// View over an entire buffer.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        let end = Addr::linear(data.len().saturating_sub(1));
        Self {
            data,
            start: Addr::linear(0),
            end,
            cursor: Addr::linear(0),
            note: Note::default(),
        }
    }

    /// View from `start` to the end of `start`'s bank.
    #[must_use]
    pub fn from_addr(data: &'a [u8], start: Addr) -> Self {
        let end = Addr::banked(start.bank(), BANK_SIZE - 1);
        Self {
            data,
            start,
            end,
            cursor: start,
            note: Note::default(),
        }
    }

    /// View over an explicit inclusive range.
    #[must_use]
    pub fn with_range(data: &'a [u8], start: Addr, end: Addr) -> Self {
        Self {
            data,
            start,
            end,
            cursor: start,
            note: Note::default(),
        }
    }

    fn derive(&self, start: Addr, end: Addr, note: Note) -> Self {
        Self {
            data: self.data,
            start,
            end,
            cursor: start,
            note,
        }
    }

    /// Minimal view spanning all of `views`, annotated as a byte run
    /// with the [`HULL_LABEL`] marker. Used to recover the overall
    /// extent of a composite record after laying out its fields.
    ///
    /// The hull of an empty slice is the explicitly defined fixed
    /// point: an empty view over an empty buffer.
    #[must_use]
    pub fn hull(views: &[View<'a>]) -> View<'a> {
        let Some(first) = views.first() else {
            return View::with_range(&[], Addr::linear(0), Addr::linear(0));
        };

        let mut start = first.start;
        let mut end = first.end;
        for v in views {
            if v.start < start {
                start = v.start;
            }
            if end < v.end {
                end = v.end;
            }
        }

        let note = first
            .note
            .merge(Note::kind(Kind::Bytes))
            .merge(Note::label(HULL_LABEL));
        first.derive(start, end, note)
    }

    // Chainable range refinements.

    /// New view starting at `addr`, keeping this view's end.
    #[must_use]
    pub fn from(&self, addr: Addr) -> Self {
        self.derive(addr, self.end, self.note)
    }

    /// New view ending at `addr`, keeping this view's start.
    #[must_use]
    pub fn to(&self, addr: Addr) -> Self {
        self.derive(self.start, addr, self.note)
    }

    /// New view of exactly `len` bytes from this view's start.
    #[must_use]
    pub fn length(&self, len: usize) -> Self {
        self.derive(self.start, self.start + (len as isize - 1), self.note)
    }

    /// New view starting one past `other`'s end.
    #[must_use]
    pub fn after(&self, other: &View<'a>) -> Self {
        self.derive(other.end + 1, self.end, self.note)
    }

    /// New view ending one before `other`'s start.
    #[must_use]
    pub fn before(&self, other: &View<'a>) -> Self {
        self.derive(self.start, other.start - 1, self.note)
    }

    /// New view extended or clipped to the last byte of start's bank.
    #[must_use]
    pub fn to_bank_end(&self) -> Self {
        self.derive(
            self.start,
            Addr::banked(self.start.bank(), BANK_SIZE - 1),
            self.note,
        )
    }

    // Annotation setters.

    /// Merge annotations without touching the range.
    #[must_use]
    pub fn expect(&self, patch: Note) -> Self {
        self.derive(self.start, self.end, self.note.merge(patch))
    }

    /// Merge annotations, and clamp the view's end for fixed-width
    /// kinds: one byte for `Byte`/`RomBank`, two for `Word`/`RomOffset`.
    #[must_use]
    pub fn is(&self, patch: Note) -> Self {
        let note = self.note.merge(patch);
        match patch.kind {
            Some(Kind::RomBank | Kind::Byte) => self.derive(self.start, self.start, note),
            Some(Kind::RomOffset | Kind::Word) => self.derive(self.start, self.start + 1, note),
            _ => self.derive(self.start, self.end, note),
        }
    }

    #[must_use]
    pub fn as_byte(&self) -> Self {
        self.is(Note::kind(Kind::Byte))
    }

    #[must_use]
    pub fn as_word(&self) -> Self {
        self.is(Note::kind(Kind::Word))
    }

    #[must_use]
    pub fn as_rom_bank(&self) -> Self {
        self.is(Note::kind(Kind::RomBank))
    }

    #[must_use]
    pub fn as_rom_offset(&self) -> Self {
        self.is(Note::kind(Kind::RomOffset))
    }

    #[must_use]
    pub fn as_little_endian(&self) -> Self {
        self.expect(Note::endian(Endian::Little))
    }

    #[must_use]
    pub fn as_big_endian(&self) -> Self {
        self.expect(Note::endian(Endian::Big))
    }

    #[must_use]
    pub fn label(&self, label: &'static str) -> Self {
        self.expect(Note::label(label))
    }

    // Accessors.

    #[must_use]
    pub fn start_addr(&self) -> Addr {
        self.start
    }

    #[must_use]
    pub fn end_addr(&self) -> Addr {
        self.end
    }

    #[must_use]
    pub fn cursor(&self) -> Addr {
        self.cursor
    }

    #[must_use]
    pub fn note(&self) -> Note {
        self.note
    }

    /// Window length in bytes (may be non-positive for inverted ranges
    /// produced by `before`/`after` on adjacent views).
    #[must_use]
    pub fn len(&self) -> isize {
        self.end - self.start + 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }

    /// Whole banks in the underlying buffer.
    #[must_use]
    pub fn banks(&self) -> usize {
        banks_in(self.data.len())
    }

    /// Bytes per unit of the declared kind: 2 for word-like kinds, 1
    /// otherwise.
    #[must_use]
    pub fn unit(&self) -> usize {
        match self.note.kind {
            Some(Kind::RomOffset | Kind::Word | Kind::Words) => 2,
            _ => 1,
        }
    }

    // Reads.

    fn in_buffer(&self, addr: Addr) -> bool {
        addr.to_linear() < self.data.len()
    }

    fn read_at(&self, addr: Addr) -> u8 {
        if self.in_buffer(addr) && self.start <= addr && addr <= self.end {
            self.data[addr.to_linear()]
        } else {
            0
        }
    }

    /// Byte at the cursor, or 0 when a full unit is not readable there.
    #[must_use]
    pub fn byte(&self) -> u8 {
        if self.unit_readable() {
            self.data[self.cursor.to_linear()]
        } else {
            0
        }
    }

    /// Reposition the cursor to `addr` and read the byte there.
    pub fn byte_at(&mut self, addr: Addr) -> u8 {
        self.cursor = addr;
        self.byte()
    }

    /// Little-endian word at `addr`; bytes outside the readable range
    /// contribute 0.
    #[must_use]
    pub fn word_le(&self, addr: Addr) -> u16 {
        u16::from(self.read_at(addr)) | u16::from(self.read_at(addr + 1)) << 8
    }

    /// Big-endian word at `addr`.
    #[must_use]
    pub fn word_be(&self, addr: Addr) -> u16 {
        u16::from(self.read_at(addr)) << 8 | u16::from(self.read_at(addr + 1))
    }

    /// Word at the cursor, composed per the declared endianness.
    ///
    /// Falls back to little-endian when no endianness is declared; the
    /// fallback is unreachable through any view that passes
    /// [`is_valid`](View::is_valid), which requires a declared byte
    /// order for multi-byte kinds.
    #[must_use]
    pub fn word(&self) -> u16 {
        match self.note.endian {
            Some(Endian::Big) => self.word_be(self.cursor),
            _ => self.word_le(self.cursor),
        }
    }

    /// Reposition the cursor to `addr` and read a word there.
    pub fn word_at(&mut self, addr: Addr) -> u16 {
        self.cursor = addr;
        self.word()
    }

    /// Parse up to `count_view`'s byte-count records starting at this
    /// view's start. Only records that validate are kept; a zero-length
    /// record ends the parse.
    #[must_use]
    pub fn repeated<R: Record<'a>>(&self, count_view: &View<'a>) -> Vec<R> {
        let mut out = Vec::new();
        if !count_view.is_valid() {
            return out;
        }

        let mut remaining = count_view.byte();
        let mut at = self.start;
        while remaining > 0 {
            remaining -= 1;
            let item = R::from_view(self.from(at));
            let len = item.byte_len();
            if item.is_valid() {
                out.push(item);
            }
            if len == 0 {
                break;
            }
            at = at + len as isize;
        }
        out
    }

    // Validity.

    fn range_ok(&self) -> bool {
        self.start <= self.cursor
            && self.cursor <= self.end
            && self.in_buffer(self.start)
            && self.in_buffer(self.end)
    }

    fn unit_readable(&self) -> bool {
        let high = self.cursor + (self.unit() as isize - 1);
        self.range_ok() && high <= self.end && self.in_buffer(high)
    }

    fn length_ok(&self) -> bool {
        let len = self.len();
        match self.note.kind {
            Some(Kind::RomBank | Kind::Byte) => len == 1,
            Some(Kind::RomOffset | Kind::Word) => len == 2,
            _ => len >= 0,
        }
    }

    fn endian_ok(&self) -> bool {
        // Multi-byte values must declare their byte order explicitly;
        // even this cartridge family's own header mixes little and big
        // endian words.
        self.unit() == 1 || (self.note.kind.is_some() && self.note.endian.is_some())
    }

    fn value_ok(&self) -> bool {
        match self.note.kind {
            Some(Kind::RomBank) => usize::from(self.byte()) < self.banks(),
            Some(Kind::RomOffset) => usize::from(self.word()) < 2 * BANK_SIZE,
            _ => true,
        }
    }

    /// Structural validity: cursor in range, a full unit readable at
    /// it, length consistent with the declared kind, byte order
    /// declared for multi-byte kinds, and declared values (bank index,
    /// ROM offset) in range for the buffer.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.range_ok()
            && self.unit_readable()
            && self.length_ok()
            && self.endian_ok()
            && self.value_ok()
    }

    /// Whether this view's window is contained in `other`'s.
    #[must_use]
    pub fn within(&self, other: &View<'a>) -> bool {
        other.start <= self.start && self.end <= other.end
    }

    /// Whether `parts` are all valid, contained in this view, and tile
    /// it exactly: sorted by start they must touch end-to-end with no
    /// gap or overlap, starting at this view's start and ending at its
    /// end.
    #[must_use]
    pub fn covered_by(&self, parts: &[View<'a>]) -> bool {
        if parts.is_empty() {
            return false;
        }
        for part in parts {
            if !part.is_valid() || !part.within(self) {
                return false;
            }
        }

        let mut sorted: Vec<&View<'a>> = parts.iter().collect();
        sorted.sort_by_key(|v| v.start);

        if sorted[0].start != self.start || sorted[sorted.len() - 1].end != self.end {
            return false;
        }
        sorted
            .windows(2)
            .all(|pair| pair[1].start == pair[0].end + 1)
    }

    /// Restartable forward pass over the window's bytes. Bytes of the
    /// window that fall outside the buffer read as 0.
    #[must_use]
    pub fn iter(&self) -> Bytes<'a> {
        Bytes {
            view: *self,
            position: self.start,
        }
    }
}

impl<'a> IntoIterator for &View<'a> {
    type Item = u8;
    type IntoIter = Bytes<'a>;

    fn into_iter(self) -> Bytes<'a> {
        self.iter()
    }
}

/// Forward byte iterator over a view's window.
pub struct Bytes<'a> {
    view: View<'a>,
    position: Addr,
}

impl Iterator for Bytes<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.position <= self.view.end {
            let b = self.view.read_at(self.position);
            self.position = self.position + 1;
            Some(b)
        } else {
            None
        }
    }
}
