//! AFM advance widths for the built-in fonts
//!
//! Widths are in 1/1000 em units for the printable ASCII range (32..=126),
//! taken from the Adobe base-14 AFM files. Characters outside the range
//! measure as `?`, matching how content streams replace them.

use super::BuiltinFont;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

fn table(font: BuiltinFont) -> &'static [u16; 95] {
    match font {
        BuiltinFont::Helvetica => &HELVETICA,
        BuiltinFont::HelveticaBold => &HELVETICA_BOLD,
        BuiltinFont::TimesRoman => &TIMES_ROMAN,
    }
}

/// Advance width of one character in 1/1000 em units.
pub fn char_width(font: BuiltinFont, c: char) -> u16 {
    let widths = table(font);
    let code = c as u32;
    if (32..=126).contains(&code) {
        widths[(code - 32) as usize]
    } else {
        widths[('?' as u32 - 32) as usize]
    }
}

/// Width of `text` rendered at `size` points.
pub fn text_width(font: BuiltinFont, text: &str, size: f64) -> f64 {
    let units: u32 = text.chars().map(|c| char_width(font, c) as u32).sum();
    units as f64 * size / 1000.0
}
