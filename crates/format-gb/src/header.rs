//! Cartridge header parser.
//!
//! The header occupies $0100-$014F of every Game Boy ROM: entry point,
//! Nintendo logo, title, a handful of one-byte configuration fields,
//! and two checksums. Later cartridges carve a manufacturer code and a
//! color flag out of the title's tail, so those two fields overlay the
//! title bytes rather than extending the layout.
//!
//! Everything in the header is little-endian except the global
//! checksum, which is stored big-endian.

use crate::addr::Addr;
use crate::view::{Kind, Note, View};

/// First byte of the header region.
pub const HEADER_START: usize = 0x0100;
/// Last byte of the header region.
pub const HEADER_END: usize = 0x014f;

/// The header region of a ROM, decomposed into typed sub-views.
pub struct Header<'a> {
    rom: View<'a>,
    region: View<'a>,
    pub entry: View<'a>,
    pub logo: View<'a>,
    pub title: View<'a>,
    pub manufacturer: View<'a>,
    pub color_flag: View<'a>,
    pub licensee: View<'a>,
    pub super_gb: View<'a>,
    pub cartridge_type: View<'a>,
    pub rom_size: View<'a>,
    pub ram_size: View<'a>,
    pub region_code: View<'a>,
    pub old_licensee: View<'a>,
    pub version: View<'a>,
    header_checksum: View<'a>,
    global_checksum: View<'a>,
}

impl<'a> Header<'a> {
    /// Decompose the header region of a whole-ROM view.
    #[must_use]
    pub fn new(rom: &View<'a>) -> Self {
        let start = Addr::linear(HEADER_START);
        let end = Addr::linear(HEADER_END);
        let v = rom.from(start).to(end).as_little_endian();

        let entry = v
            .from(start)
            .length(4)
            .expect(Note::kind(Kind::Code))
            .label("entry");
        let logo = v
            .after(&entry)
            .to(Addr::linear(0x0133))
            .is(Note::kind(Kind::Bytes))
            .label("logo");
        let title = v
            .after(&logo)
            .to(Addr::linear(0x0143))
            .is(Note::kind(Kind::Text))
            .label("title");
        let manufacturer = v
            .from(Addr::linear(0x013f))
            .to(Addr::linear(0x0142))
            .is(Note::kind(Kind::Text))
            .label("manufacturer");
        let color_flag = v.from(Addr::linear(0x0143)).as_byte().label("color");
        let licensee = v
            .after(&title)
            .is(Note::kind(Kind::Text))
            .length(2)
            .label("licensee");
        let super_gb = v.after(&licensee).as_byte().label("super-gb");
        let cartridge_type = v.after(&super_gb).as_byte().label("cartridge");
        let rom_size = v.after(&cartridge_type).as_byte().label("rom-size");
        let ram_size = v.after(&rom_size).as_byte().label("ram-size");
        let region_code = v.after(&ram_size).as_byte().label("region");
        let old_licensee = v.after(&region_code).as_byte().label("old-licensee");
        let version = v.after(&old_licensee).as_byte().label("version");
        let header_checksum = v.after(&version).as_byte().label("header-checksum");
        let global_checksum = v
            .after(&header_checksum)
            .as_word()
            .as_big_endian()
            .label("global-checksum");

        Self {
            rom: *rom,
            region: v,
            entry,
            logo,
            title,
            manufacturer,
            color_flag,
            licensee,
            super_gb,
            cartridge_type,
            rom_size,
            ram_size,
            region_code,
            old_licensee,
            version,
            header_checksum,
            global_checksum,
        }
    }

    /// The header checksum byte as stored at $014D.
    #[must_use]
    pub fn stored_header_checksum(&self) -> u8 {
        self.header_checksum.byte()
    }

    /// Recompute the header checksum: a running `acc - byte - 1` over
    /// the bytes between the logo and the checksum field ($0134-$014C).
    #[must_use]
    pub fn computed_header_checksum(&self) -> u8 {
        let range = self.region.after(&self.logo).before(&self.header_checksum);
        let mut acc = 0u8;
        for b in range.iter() {
            acc = acc.wrapping_sub(b).wrapping_sub(1);
        }
        acc
    }

    /// The global checksum word as stored (big-endian) at $014E-$014F.
    #[must_use]
    pub fn stored_global_checksum(&self) -> u16 {
        self.global_checksum.word()
    }

    /// Recompute the global checksum: the 16-bit sum of every byte in
    /// the ROM except the two bytes of the checksum field itself.
    #[must_use]
    pub fn computed_global_checksum(&self) -> u16 {
        let stored = self.global_checksum.word();
        let mut acc = 0u16;
        // Start below zero by the stored bytes, then sum everything;
        // the field's own contribution cancels out.
        acc = acc.wrapping_sub(stored >> 8);
        acc = acc.wrapping_sub(stored & 0xff);
        for b in self.rom.iter() {
            acc = acc.wrapping_add(u16::from(b));
        }
        acc
    }

    /// Views of the header's checksum fields, for in-place repair.
    #[must_use]
    pub fn global_checksum_field(&self) -> View<'a> {
        self.global_checksum
    }

    /// Every named field, overlays included, in layout order.
    #[must_use]
    pub fn fields(&self) -> [View<'a>; 15] {
        [
            self.entry,
            self.logo,
            self.title,
            self.manufacturer,
            self.color_flag,
            self.licensee,
            self.super_gb,
            self.cartridge_type,
            self.rom_size,
            self.ram_size,
            self.region_code,
            self.old_licensee,
            self.version,
            self.header_checksum,
            self.global_checksum,
        ]
    }

    /// The thirteen non-overlapping fields, in layout order. The
    /// manufacturer code and color flag are overlays on the title and
    /// are not part of the tiling.
    fn tiling(&self) -> [View<'a>; 13] {
        [
            self.entry,
            self.logo,
            self.title,
            self.licensee,
            self.super_gb,
            self.cartridge_type,
            self.rom_size,
            self.ram_size,
            self.region_code,
            self.old_licensee,
            self.version,
            self.header_checksum,
            self.global_checksum,
        ]
    }

    /// Header validity: the region view is valid, the disjoint fields
    /// tile $0100-$014F exactly, the two overlay fields are valid and
    /// sit inside the title, and both checksums recompute to their
    /// stored values.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.region.is_valid()
            && self.region.covered_by(&self.tiling())
            && self.manufacturer.is_valid()
            && self.manufacturer.within(&self.title)
            && self.color_flag.is_valid()
            && self.color_flag.within(&self.title)
            && self.computed_header_checksum() == self.stored_header_checksum()
            && self.computed_global_checksum() == self.stored_global_checksum()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::addr::BANK_SIZE;

    /// A two-bank image with a coherent header: recognizable logo
    /// bytes, an ASCII title, and both checksums solved.
    pub(crate) fn make_rom() -> Vec<u8> {
        let mut data = vec![0u8; 2 * BANK_SIZE];
        for (i, b) in data.iter_mut().enumerate() {
            *b = (i & 0xff) as u8;
        }
        for (i, b) in data[0x104..=0x133].iter_mut().enumerate() {
            *b = 0xce ^ (i as u8);
        }
        data[0x134..=0x143].fill(0);
        data[0x134..0x134 + 11].copy_from_slice(b"POKEMON RED");
        data[0x147] = 0x13; // MBC3+RAM+BATTERY
        data[0x148] = 0x01;
        data[0x149] = 0x03;

        // Solve the header checksum over $0134-$014C.
        let mut acc = 0u8;
        for &b in &data[0x134..=0x14c] {
            acc = acc.wrapping_sub(b).wrapping_sub(1);
        }
        data[0x14d] = acc;

        // Solve the global checksum (sum excludes its own two bytes).
        data[0x14e] = 0;
        data[0x14f] = 0;
        let sum = data
            .iter()
            .fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)));
        data[0x14e] = (sum >> 8) as u8;
        data[0x14f] = (sum & 0xff) as u8;
        data
    }

    #[test]
    fn field_layout() {
        let data = make_rom();
        let v = View::new(&data);
        let h = Header::new(&v);

        let ranges = [
            (h.entry, 0x100, 0x103),
            (h.logo, 0x104, 0x133),
            (h.title, 0x134, 0x143),
            (h.manufacturer, 0x13f, 0x142),
            (h.color_flag, 0x143, 0x143),
            (h.licensee, 0x144, 0x145),
            (h.super_gb, 0x146, 0x146),
            (h.cartridge_type, 0x147, 0x147),
            (h.rom_size, 0x148, 0x148),
            (h.ram_size, 0x149, 0x149),
            (h.region_code, 0x14a, 0x14a),
            (h.old_licensee, 0x14b, 0x14b),
            (h.version, 0x14c, 0x14c),
        ];
        for (view, start, end) in ranges {
            assert_eq!(view.start_addr().to_linear(), start);
            assert_eq!(view.end_addr().to_linear(), end);
        }
        assert_eq!(h.global_checksum_field().start_addr().to_linear(), 0x14e);
        assert_eq!(h.global_checksum_field().end_addr().to_linear(), 0x14f);
    }

    #[test]
    fn checksums_recompute_on_good_rom() {
        let data = make_rom();
        let v = View::new(&data);
        let h = Header::new(&v);
        assert_eq!(h.computed_header_checksum(), h.stored_header_checksum());
        assert_eq!(h.computed_global_checksum(), h.stored_global_checksum());
        assert!(h.is_valid());
    }

    #[test]
    fn header_checksum_covers_title_through_version() {
        for flip in [0x134usize, 0x140, 0x147, 0x14c] {
            let mut data = make_rom();
            data[flip] ^= 0xff;
            let v = View::new(&data);
            let h = Header::new(&v);
            assert_ne!(
                h.computed_header_checksum(),
                h.stored_header_checksum(),
                "flip at {flip:#x}"
            );
            assert!(!h.is_valid());
        }
    }

    #[test]
    fn global_checksum_covers_everything_else() {
        for flip in [0x0usize, 0x103, 0x120, 0x150, 0x4000, 0x7fff] {
            let mut data = make_rom();
            data[flip] ^= 0x01;
            let v = View::new(&data);
            let h = Header::new(&v);
            // The header checksum only watches $0134-$014C.
            if !(0x134..=0x14c).contains(&flip) {
                assert_eq!(h.computed_header_checksum(), h.stored_header_checksum());
            }
            assert_ne!(
                h.computed_global_checksum(),
                h.stored_global_checksum(),
                "flip at {flip:#x}"
            );
            assert!(!h.is_valid());
        }
    }

    #[test]
    fn global_checksum_ignores_its_own_field() {
        let mut data = make_rom();
        let v = View::new(&data);
        let before = Header::new(&v).computed_global_checksum();
        drop(v);

        data[0x14e] ^= 0xff;
        data[0x14f] ^= 0xff;
        let v = View::new(&data);
        let h = Header::new(&v);
        assert_eq!(h.computed_global_checksum(), before);
        assert_ne!(h.stored_global_checksum(), before);
    }
}
