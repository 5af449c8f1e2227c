//! Heuristic text scanner.
//!
//! ROM images carry no index of their embedded strings, so candidates
//! are found the way `strings(1)` finds them in arbitrary binaries: a
//! single forward pass that tracks runs of plausibly-textual bytes and
//! keeps the ones that look enough like prose. The threshold is the
//! sole filter; nothing is second-guessed after the pass.

use crate::addr::Addr;
use crate::text;
use crate::view::View;

/// Acceptance threshold for candidate runs.
///
/// A run is kept when it contains more than `min_text` letter/digit
/// bytes and those bytes make up at least `text_ratio.0 / text_ratio.1`
/// of the run's total length.
#[derive(Clone, Copy, Debug)]
pub struct ScanRules {
    pub min_text: usize,
    pub text_ratio: (usize, usize),
}

impl Default for ScanRules {
    /// More than 4 letter/digit bytes, making up at least 80% of the run.
    fn default() -> Self {
        Self {
            min_text: 4,
            text_ratio: (4, 5),
        }
    }
}

impl ScanRules {
    fn accepts(&self, text: usize, length: usize) -> bool {
        let (num, den) = self.text_ratio;
        text > self.min_text && text * den >= length * num
    }
}

/// Decode the text run starting at `view`'s start, up to its end; the
/// codec stops at the terminator or the first unmapped byte.
#[must_use]
pub fn decode_at(view: &View<'_>) -> String {
    text::decode(view.iter())
}

/// Scan the view for candidate string locations.
///
/// A run is a maximal sequence of consecutive bytes that are non-zero,
/// table-mapped, and not the terminator. On every run break (and at the
/// end of the window) the run's start address is recorded iff `rules`
/// accepts its letter/digit tally against its total length.
#[must_use]
pub fn scan(view: &View<'_>, rules: ScanRules) -> Vec<Addr> {
    let mut found = Vec::new();
    let mut start = view.start_addr();
    let mut cursor = view.start_addr();
    let mut length = 0usize;
    let mut texts = 0usize;

    for b in view.iter() {
        if b == 0 || !text::is_mapped(b) || b == text::TERMINATOR {
            if rules.accepts(texts, length) {
                found.push(start);
            }
            length = 0;
            texts = 0;
        } else {
            length += 1;
            if text::is_text(b) {
                texts += 1;
            }
        }

        cursor = cursor + 1;
        if length == 0 {
            start = cursor;
        }
    }

    // A run touching the end of the window is judged like any other.
    if rules.accepts(texts, length) {
        found.push(start);
    }

    found
}

/// Scan and decode: the final address → string mapping.
#[must_use]
pub fn strings<'a>(
    view: &View<'a>,
    rules: ScanRules,
) -> std::collections::BTreeMap<Addr, String> {
    scan(view, rules)
        .into_iter()
        .map(|addr| (addr, decode_at(&view.from(addr))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Buffer with `runs` placed back to back, each followed by a zero.
    fn make_buffer(runs: &[&[u8]]) -> Vec<u8> {
        let mut data = vec![0u8; 8];
        for run in runs {
            data.extend_from_slice(run);
            data.push(0);
        }
        data.extend_from_slice(&[0; 8]);
        data
    }

    #[test]
    fn finds_plain_text_run() {
        // Ten letter bytes, then a zero break.
        let run: Vec<u8> = (0x80..0x8a).collect();
        let data = make_buffer(&[&run]);
        let v = View::new(&data);

        let found = scan(&v, ScanRules::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0], Addr::linear(8));
        assert_eq!(decode_at(&v.from(found[0])), "ABCDEFGHIJ");
    }

    #[test]
    fn short_run_is_rejected() {
        let data = make_buffer(&[&[0x80, 0x81, 0x82]]);
        assert!(scan(&View::new(&data), ScanRules::default()).is_empty());
    }

    #[test]
    fn low_density_run_is_rejected() {
        // 5 letters drowned in 7 control/punctuation glyphs: 5/12 < 80%.
        let run = [
            0x80, 0x7f, 0x7f, 0x81, 0x7f, 0x7f, 0x82, 0x7f, 0x7f, 0x83, 0x7f, 0x84,
        ];
        assert!(scan(&View::new(&make_buffer(&[&run])), ScanRules::default()).is_empty());

        // The same run passes a permissive ratio.
        let loose = ScanRules {
            min_text: 4,
            text_ratio: (1, 3),
        };
        assert_eq!(scan(&View::new(&make_buffer(&[&run])), loose).len(), 1);
    }

    #[test]
    fn terminator_and_unmapped_both_break_runs() {
        let a: Vec<u8> = (0x80..0x86).collect();
        let b: Vec<u8> = (0x90..0x96).collect();
        let mut data = vec![0u8; 4];
        data.extend_from_slice(&a);
        data.push(text::TERMINATOR);
        data.extend_from_slice(&b);
        data.push(0xc0); // unmapped
        data.extend_from_slice(&[0; 4]);

        let v = View::new(&data);
        let found = scan(&v, ScanRules::default());
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], Addr::linear(4));
        assert_eq!(found[1], Addr::linear(4 + a.len() + 1));
    }

    #[test]
    fn run_at_end_of_window_is_flushed() {
        let mut data = vec![0u8; 4];
        data.extend_from_slice(&[0x92, 0x93, 0x80, 0x91, 0x93, 0x94, 0x8f]);
        let v = View::new(&data);
        let found = scan(&v, ScanRules::default());
        assert_eq!(found.len(), 1);
        assert_eq!(decode_at(&v.from(found[0])), "STARTUP");
    }

    #[test]
    fn strings_maps_addresses_to_decoded_text() {
        let red: Vec<u8> = vec![0x91, 0xa4, 0xa3, 0xf6, 0xf7]; // "Red01"
        let blue: Vec<u8> = vec![0x81, 0xab, 0xb4, 0xa4, 0xb2]; // "Blues"
        let data = make_buffer(&[&red, &blue]);
        let v = View::new(&data);

        let map = strings(&v, ScanRules::default());
        assert_eq!(map.len(), 2);
        assert_eq!(map[&Addr::linear(8)], "Red01");
        assert_eq!(map[&Addr::linear(8 + red.len() + 1)], "Blues");
    }
}
