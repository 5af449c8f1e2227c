//! End-to-end exercise of a synthetic two-bank cartridge image:
//! header decomposition, checksum verification and repair, and string
//! discovery, all through the public API.

use format_gb::{Addr, Header, Rom, ScanRules, View, BANK_SIZE};

/// A coherent 32 KiB image: solved checksums, an ASCII title, and two
/// encoded strings planted in bank 1.
fn make_image() -> Vec<u8> {
    let mut data = vec![0u8; 2 * BANK_SIZE];

    data[0x100..0x104].copy_from_slice(&[0x00, 0xc3, 0x50, 0x01]); // nop; jp $0150
    for (i, b) in data[0x104..=0x133].iter_mut().enumerate() {
        *b = 0x66 ^ (i as u8);
    }
    data[0x134..0x134 + 12].copy_from_slice(b"POKEMON BLUE");
    data[0x147] = 0x13;
    data[0x148] = 0x01;

    // "BULBASAUR" and a terminated "OAKLAB" in bank 1.
    let bulbasaur = [0x81, 0x94, 0x8b, 0x81, 0x80, 0x92, 0x80, 0x94, 0x91];
    data[0x5000..0x5000 + bulbasaur.len()].copy_from_slice(&bulbasaur);
    let oaklab = [0x8e, 0x80, 0x8a, 0x8b, 0x80, 0x81, 0x50];
    data[0x6000..0x6000 + oaklab.len()].copy_from_slice(&oaklab);

    let mut acc = 0u8;
    for &b in &data[0x134..=0x14c] {
        acc = acc.wrapping_sub(b).wrapping_sub(1);
    }
    data[0x14d] = acc;

    let sum = data
        .iter()
        .fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)));
    data[0x14e] = (sum >> 8) as u8;
    data[0x14f] = (sum & 0xff) as u8;

    data
}

#[test]
fn header_is_valid_and_titled() {
    let rom = Rom::from_bytes(make_image()).expect("valid image");
    assert_eq!(rom.title(), "POKEMON BLUE");
    assert!(rom.header().is_valid());
    assert!(rom.checksum_ok());
}

#[test]
fn single_corrupt_byte_breaks_the_right_checksum() {
    // Between logo end and the header-checksum field: both checksums go.
    let mut data = make_image();
    data[0x139] ^= 0x20;
    let rom = Rom::from_bytes(data).expect("valid image");
    let header = rom.header();
    assert_ne!(
        header.computed_header_checksum(),
        header.stored_header_checksum()
    );
    assert!(!header.is_valid());

    // Anywhere else: only the global checksum goes.
    let mut data = make_image();
    data[0x4123] ^= 0x20;
    let rom = Rom::from_bytes(data).expect("valid image");
    let header = rom.header();
    assert_eq!(
        header.computed_header_checksum(),
        header.stored_header_checksum()
    );
    assert!(!rom.checksum_ok());
    assert!(!header.is_valid());
}

#[test]
fn repair_restores_validity() {
    let mut data = make_image();
    data[0x14e] = 0xde;
    data[0x14f] = 0xad;
    let mut rom = Rom::from_bytes(data).expect("valid image");
    assert!(!rom.header().is_valid());
    assert!(rom.fix_checksum());
    assert!(rom.header().is_valid());
}

#[test]
fn embedded_strings_are_discovered_and_decoded() {
    let rom = Rom::from_bytes(make_image()).expect("valid image");
    let found = rom.strings();

    assert_eq!(
        found.get(&Addr::linear(0x5000)).map(String::as_str),
        Some("BULBASAUR")
    );
    assert_eq!(
        found.get(&Addr::linear(0x6000)).map(String::as_str),
        Some("OAKLAB")
    );
    assert_eq!(
        rom.string_at(Addr::linear(0x5000), Addr::linear(0x5008)),
        "BULBASAUR"
    );
}

#[test]
fn scan_rules_are_tunable() {
    let rom = Rom::from_bytes(make_image()).expect("valid image");
    // Demand more text than any planted run contains.
    let strict = ScanRules {
        min_text: 16,
        text_ratio: (4, 5),
    };
    assert!(rom.strings_with(strict).is_empty());
}

#[test]
fn header_fields_share_the_backing_buffer() {
    let data = make_image();
    let view = View::new(&data);
    let header = Header::new(&view);

    // The title field decodes through the same bytes the facade reads.
    let raw: Vec<u8> = header.title.iter().collect();
    assert_eq!(&raw[..12], b"POKEMON BLUE");
    assert_eq!(header.title.len(), 16);
    assert!(header.manufacturer.within(&header.title));
}
