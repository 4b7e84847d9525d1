use unicode_normalization::UnicodeNormalization as _;

/// Points to document units (millimetres).
pub(crate) const PT_TO_MM: f32 = 25.4 / 72.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Face {
    Regular,
    Bold,
}

/// Metrics and resource name of one standard Type1 face.
pub(crate) struct FontEntry {
    pub(crate) pdf_name: &'static str,
    pub(crate) base_font: &'static str,
    /// Advance widths for ASCII 32..=126 in 1000-units.
    ascii_widths_1000: &'static [f32; 95],
}

impl FontEntry {
    /// Width of a single character in 1000-units. Characters outside WinAnsi are
    /// drawn as `?` and measured the same way.
    pub(crate) fn char_width_1000(&self, ch: char) -> f32 {
        match ch {
            ' '..='~' => self.ascii_widths_1000[(ch as u32 - 32) as usize],
            '\u{2014}' => 1000.0,                         // em dash
            '\u{2013}' | '\u{20AC}' => 556.0,             // en dash, euro
            '\u{2022}' => 350.0,                          // bullet
            '\u{201E}' | '\u{201C}' | '\u{201D}' => 333.0, // quotes
            '\u{00DF}' => 611.0,                          // ß
            '\u{00A0}' => self.char_width_1000(' '),
            _ if ch.is_control() => 0.0,
            _ if char_to_winansi(ch) == 0 => self.char_width_1000('?'),
            _ => {
                // Accented Latin letters measure as their base letter.
                match ch.nfd().next() {
                    Some(base) if base.is_ascii() && base != ch => self.char_width_1000(base),
                    _ => 556.0,
                }
            }
        }
    }

    /// Width of `text` at `font_size` points, in document units.
    pub(crate) fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum::<f32>()
            * PT_TO_MM
    }
}

pub(crate) struct FontSet {
    pub(crate) regular: FontEntry,
    pub(crate) bold: FontEntry,
}

impl FontSet {
    pub(crate) fn helvetica() -> FontSet {
        FontSet {
            regular: FontEntry {
                pdf_name: "F1",
                base_font: "Helvetica",
                ascii_widths_1000: &HELVETICA_WIDTHS,
            },
            bold: FontEntry {
                pdf_name: "F2",
                base_font: "Helvetica-Bold",
                ascii_widths_1000: &HELVETICA_BOLD_WIDTHS,
            },
        }
    }

    pub(crate) fn face(&self, face: Face) -> &FontEntry {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
        }
    }

    pub(crate) fn entries(&self) -> [&FontEntry; 2] {
        [&self.regular, &self.bold]
    }
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007E => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
/// Unmappable characters become `?`; control characters are dropped.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .filter(|c| !c.is_control())
        .map(|c| match char_to_winansi(c) {
            0 => b'?',
            byte => byte,
        })
        .collect()
}

#[rustfmt::skip]
static HELVETICA_WIDTHS: [f32; 95] = [
    278.0, 278.0, 355.0, 556.0, 556.0, 889.0, 667.0, 191.0, 333.0, 333.0, // space ! " # $ % & ' ( )
    389.0, 584.0, 278.0, 333.0, 278.0, 278.0,                             // * + , - . /
    556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0, // 0-9
    278.0, 278.0, 584.0, 584.0, 584.0, 556.0, 1015.0,                     // : ; < = > ? @
    667.0, 667.0, 722.0, 722.0, 667.0, 611.0, 778.0, 722.0, 278.0, 500.0, // A-J
    667.0, 556.0, 833.0, 722.0, 778.0, 667.0, 778.0, 722.0, 667.0, 611.0, // K-T
    722.0, 667.0, 944.0, 667.0, 667.0, 611.0,                             // U-Z
    278.0, 278.0, 278.0, 469.0, 556.0, 333.0,                             // [ \ ] ^ _ `
    556.0, 556.0, 500.0, 556.0, 556.0, 278.0, 556.0, 556.0, 222.0, 222.0, // a-j
    500.0, 222.0, 833.0, 556.0, 556.0, 556.0, 556.0, 333.0, 500.0, 278.0, // k-t
    556.0, 500.0, 722.0, 500.0, 500.0, 500.0,                             // u-z
    334.0, 260.0, 334.0, 584.0,                                           // { | } ~
];

#[rustfmt::skip]
static HELVETICA_BOLD_WIDTHS: [f32; 95] = [
    278.0, 333.0, 474.0, 556.0, 556.0, 889.0, 722.0, 238.0, 333.0, 333.0,
    389.0, 584.0, 278.0, 333.0, 278.0, 278.0,
    556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0,
    333.0, 333.0, 584.0, 584.0, 584.0, 611.0, 975.0,
    722.0, 722.0, 722.0, 722.0, 667.0, 611.0, 778.0, 722.0, 278.0, 556.0,
    722.0, 611.0, 833.0, 722.0, 778.0, 667.0, 778.0, 722.0, 667.0, 611.0,
    722.0, 667.0, 944.0, 667.0, 667.0, 611.0,
    333.0, 278.0, 333.0, 584.0, 556.0, 333.0,
    556.0, 611.0, 556.0, 611.0, 556.0, 333.0, 611.0, 611.0, 278.0, 278.0,
    556.0, 278.0, 889.0, 611.0, 611.0, 611.0, 611.0, 389.0, 556.0, 333.0,
    611.0, 556.0, 778.0, 556.0, 556.0, 500.0,
    389.0, 280.0, 389.0, 584.0,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_cover_printable_ascii() {
        let fonts = FontSet::helvetica();
        assert_eq!(fonts.regular.char_width_1000('A'), 667.0);
        assert_eq!(fonts.regular.char_width_1000('~'), 584.0);
        assert_eq!(fonts.bold.char_width_1000('m'), 889.0);
    }

    #[test]
    fn accented_letters_use_base_width() {
        let fonts = FontSet::helvetica();
        assert_eq!(
            fonts.regular.char_width_1000('é'),
            fonts.regular.char_width_1000('e')
        );
        assert_eq!(
            fonts.bold.char_width_1000('Ü'),
            fonts.bold.char_width_1000('U')
        );
    }

    #[test]
    fn text_width_scales_with_size() {
        let fonts = FontSet::helvetica();
        let w10 = fonts.regular.text_width("Personaldaten", 10.0);
        let w20 = fonts.regular.text_width("Personaldaten", 20.0);
        assert!((w20 - 2.0 * w10).abs() < 1e-4);
        assert_eq!(fonts.regular.text_width("", 10.0), 0.0);
    }

    #[test]
    fn winansi_encoding() {
        assert_eq!(to_winansi_bytes("Müller"), b"M\xFCller".to_vec());
        assert_eq!(to_winansi_bytes("\u{2014}"), vec![0x97]);
        assert_eq!(to_winansi_bytes("\u{2022}"), vec![0x95]);
        assert_eq!(to_winansi_bytes("Иван"), b"????".to_vec());
        assert_eq!(to_winansi_bytes("a\tb"), b"ab".to_vec());
    }
}
