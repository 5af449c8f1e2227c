//! Cartridge ROM inspector binary.
//!
//! Prints a summary of a ROM image (title, size, checksum state), dumps
//! the decomposed header, scans for embedded text, repairs the global
//! checksum, and emits the whole lot as a JSON report for scripting.

use std::path::{Path, PathBuf};
use std::process;

use format_gb::{Header, Kind, Rom, ScanRules, View};
use serde::Serialize;
use sha1::{Digest, Sha1};

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

struct CliArgs {
    rom_path: Option<PathBuf>,
    show_header: bool,
    strings: bool,
    fix_checksum: bool,
    output: Option<PathBuf>,
    json: bool,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        rom_path: None,
        show_header: false,
        strings: false,
        fix_checksum: false,
        output: None,
        json: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rom" => {
                i += 1;
                cli.rom_path = args.get(i).map(PathBuf::from);
            }
            "--show-header" => {
                cli.show_header = true;
            }
            "--strings" => {
                cli.strings = true;
            }
            "--fix-checksum" => {
                cli.fix_checksum = true;
            }
            "--output" => {
                i += 1;
                cli.output = args.get(i).map(PathBuf::from);
            }
            "--json" => {
                cli.json = true;
            }
            "--help" | "-h" => {
                eprintln!("Usage: gb-rom-tool --rom <file> [OPTIONS]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --rom <file>      Cartridge ROM image to inspect");
                eprintln!("  --show-header     Dump the decomposed $0100-$014F header");
                eprintln!("  --strings         Scan the image for embedded text");
                eprintln!("  --fix-checksum    Recompute and write the global checksum");
                eprintln!("  --output <file>   Write the (repaired) image here instead of in place");
                eprintln!("  --json            Emit a JSON report instead of text");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

// ---------------------------------------------------------------------------
// JSON report
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct FieldReport {
    name: &'static str,
    start: usize,
    end: usize,
    bytes: String,
}

#[derive(Serialize)]
struct StringReport {
    offset: usize,
    text: String,
}

#[derive(Serialize)]
struct Report {
    file: String,
    size: usize,
    banks: usize,
    sha1: String,
    title: String,
    header_valid: bool,
    checksum_ok: bool,
    stored_header_checksum: u8,
    computed_header_checksum: u8,
    stored_global_checksum: u16,
    computed_global_checksum: u16,
    fields: Vec<FieldReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    strings: Option<Vec<StringReport>>,
}

fn hex_bytes(view: &View<'_>) -> String {
    view.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn field_reports(header: &Header<'_>) -> Vec<FieldReport> {
    header
        .fields()
        .iter()
        .map(|f| FieldReport {
            name: f.note().label.unwrap_or("?"),
            start: f.start_addr().to_linear(),
            end: f.end_addr().to_linear(),
            bytes: hex_bytes(f),
        })
        .collect()
}

fn build_report(path: &Path, rom: &Rom, with_strings: bool) -> Report {
    let mut hasher = Sha1::new();
    hasher.update(rom.data());
    let digest = hasher.finalize();

    let header = rom.header();
    let strings = with_strings.then(|| {
        rom.strings()
            .into_iter()
            .map(|(addr, text)| StringReport {
                offset: addr.to_linear(),
                text,
            })
            .collect()
    });

    Report {
        file: path.display().to_string(),
        size: rom.data().len(),
        banks: rom.view().banks(),
        sha1: format!("{digest:x}"),
        title: rom.title(),
        header_valid: header.is_valid(),
        checksum_ok: rom.checksum_ok(),
        stored_header_checksum: header.stored_header_checksum(),
        computed_header_checksum: header.computed_header_checksum(),
        stored_global_checksum: header.stored_global_checksum(),
        computed_global_checksum: header.computed_global_checksum(),
        fields: field_reports(&header),
        strings,
    }
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

fn print_summary(rom: &Rom) {
    let header = rom.header();
    println!("Title:    {}", rom.title());
    println!(
        "Size:     {} bytes ({} banks)",
        rom.data().len(),
        rom.view().banks()
    );
    println!(
        "Header:   {:#04x} stored, {:#04x} computed",
        header.stored_header_checksum(),
        header.computed_header_checksum()
    );
    println!(
        "Checksum: {:#06x} stored, {:#06x} computed ({})",
        header.stored_global_checksum(),
        header.computed_global_checksum(),
        if rom.checksum_ok() { "OK" } else { "MISMATCH" }
    );
}

/// Human rendering of a field's content: printable ASCII for text
/// fields, the composed value for words, nothing extra for byte runs.
fn render_value(f: &View<'_>) -> String {
    match f.note().kind {
        Some(Kind::Text) => f
            .iter()
            .map(|b| {
                if b.is_ascii_graphic() || b == b' ' {
                    char::from(b)
                } else {
                    '.'
                }
            })
            .collect(),
        Some(Kind::Word | Kind::RomOffset) => format!("{:#06x}", f.word()),
        _ => String::new(),
    }
}

fn print_header(rom: &Rom) {
    println!();
    for f in rom.header().fields() {
        let value = render_value(&f);
        println!(
            "  {:<16} {:#06x}-{:#06x}  {}{}{}",
            f.note().label.unwrap_or("?"),
            f.start_addr().to_linear(),
            f.end_addr().to_linear(),
            hex_bytes(&f),
            if value.is_empty() { "" } else { "  " },
            value
        );
    }
}

fn print_strings(rom: &Rom) {
    println!();
    for (addr, text) in rom.strings_with(ScanRules::default()) {
        println!("  {:#08x}  {text}", addr.to_linear());
    }
}

fn main() {
    let cli = parse_args();
    let Some(path) = cli.rom_path else {
        eprintln!("No ROM given (--rom <file>, see --help)");
        process::exit(1);
    };

    let mut rom = match Rom::load(&path) {
        Ok(rom) => rom,
        Err(e) => {
            eprintln!("{}: {e}", path.display());
            process::exit(1);
        }
    };

    if cli.fix_checksum {
        if !rom.fix_checksum() {
            eprintln!("Checksum repair failed to verify");
            process::exit(1);
        }
        let out = cli.output.as_ref().unwrap_or(&path);
        if let Err(e) = rom.save(out) {
            eprintln!("{}: {e}", out.display());
            process::exit(1);
        }
        if !cli.json {
            println!("Wrote {}", out.display());
        }
    }

    if cli.json {
        let report = build_report(&path, &rom, cli.strings);
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_default()
        );
        return;
    }

    print_summary(&rom);
    if cli.show_header {
        print_header(&rom);
    }
    if cli.strings {
        print_strings(&rom);
    }
}
