//! Font metrics, line wrapping and WinAnsi encoding.
//!
//! Only the two standard-14 faces are used (`Helvetica`, `Helvetica-Bold`),
//! so no font program is embedded and widths come from the Adobe AFM tables
//! below. Widths are in 1/1000 em.

/// The two faces the layout uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// Name of the font in the page resource dictionary.
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
        }
    }
}

/// Line height as a multiple of the font size.
pub const LINE_SPACING: f32 = 1.2;

pub fn line_height(size: f32) -> f32 {
    size * LINE_SPACING
}

// AFM widths for 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Width used for non-ASCII WinAnsi glyphs (accented letters, currency signs).
const FALLBACK_WIDTH: u16 = 556;

pub fn char_width(font: Font, c: char) -> u16 {
    let table = match font {
        Font::Regular => &HELVETICA_WIDTHS,
        Font::Bold => &HELVETICA_BOLD_WIDTHS,
    };
    match c {
        ' '..='~' => table[c as usize - 0x20],
        // Encoded as a space
        _ if c.is_control() => table[0],
        _ if win_ansi_byte(c).is_some() => FALLBACK_WIDTH,
        // Rendered as '?'
        _ => table[usize::from(b'?') - 0x20],
    }
}

/// Width of `text` in points at `size`.
pub fn measure(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(font, c))).sum();
    units as f32 * size / 1000.0
}

/// Longest prefix of `text` that fits in `max_width`. No ellipsis is added.
pub fn truncate_to_width(text: &str, font: Font, size: f32, max_width: f32) -> &str {
    let mut width = 0.0;
    for (idx, c) in text.char_indices() {
        width += f32::from(char_width(font, c)) * size / 1000.0;
        if width > max_width {
            return &text[..idx];
        }
    }
    text
}

/// Greedy word wrap.
///
/// Explicit newlines start a new line; a single word wider than
/// `max_width` is broken between characters. Blank input yields no lines.
pub fn wrap(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let space = measure(" ", font, size);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0.0;
        for word in paragraph.split_whitespace() {
            let word_width = measure(word, font, size);
            if !current.is_empty() {
                if current_width + space + word_width <= max_width {
                    current.push(' ');
                    current.push_str(word);
                    current_width += space + word_width;
                    continue;
                }
                lines.push(std::mem::take(&mut current));
            }

            let mut rest = word;
            while measure(rest, font, size) > max_width {
                let head = truncate_to_width(rest, font, size, max_width);
                // Always make progress, even if one glyph is wider than the line.
                let head = if head.is_empty() {
                    let first = rest.chars().next().map_or(rest.len(), char::len_utf8);
                    &rest[..first]
                } else {
                    head
                };
                lines.push(head.to_string());
                rest = &rest[head.len()..];
            }
            current = rest.to_string();
            current_width = measure(rest, font, size);
        }
        lines.push(current);
    }
    lines
}

/// Encode text for a simple font with `/WinAnsiEncoding`.
///
/// Characters outside the encoding become `?`; tabs and other control
/// characters become spaces.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            c if c.is_control() => b' ',
            c => win_ansi_byte(c).unwrap_or(b'?'),
        })
        .collect()
}

fn win_ansi_byte(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => {
            let byte = match c {
                '€' => 0x80,
                '‚' => 0x82,
                'ƒ' => 0x83,
                '„' => 0x84,
                '…' => 0x85,
                '†' => 0x86,
                '‡' => 0x87,
                'ˆ' => 0x88,
                '‰' => 0x89,
                'Š' => 0x8A,
                '‹' => 0x8B,
                'Œ' => 0x8C,
                'Ž' => 0x8E,
                '\u{2018}' => 0x91,
                '\u{2019}' => 0x92,
                '\u{201C}' => 0x93,
                '\u{201D}' => 0x94,
                '•' => 0x95,
                '–' => 0x96,
                '—' => 0x97,
                '˜' => 0x98,
                '™' => 0x99,
                'š' => 0x9A,
                '›' => 0x9B,
                'œ' => 0x9C,
                'ž' => 0x9E,
                'Ÿ' => 0x9F,
                _ => return None,
            };
            Some(byte)
        }
    }
}
