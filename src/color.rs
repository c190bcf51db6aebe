//! Color grammar shared by `pass.json` and `passprint.toml`.
//!
//! Accepted forms:
//!
//! ```text
//! rgb(60, 79, 109)     decimal components 0-255, whitespace tolerant
//! #3c4f6d  3c4f6d      hex sextet, case-insensitive, optional '#'
//! #fff     fff         hex triplet, each digit doubled
//! ```
//!
//! Anything else parses to `None`. The layout engine never fails on a bad
//! color; it substitutes the per-role default from the render config.

use std::fmt;

/// An 8-bit-per-channel RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components scaled to `0.0..=1.0`, the form PDF color operators take.
    pub fn to_unit(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Which pass color a value stands for. Each role has its own fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    Background,
    Foreground,
    Label,
}

impl ColorRole {
    pub fn manifest_key(self) -> &'static str {
        match self {
            ColorRole::Background => "backgroundColor",
            ColorRole::Foreground => "foregroundColor",
            ColorRole::Label => "labelColor",
        }
    }
}

/// Parse a color string. Returns `None` for anything outside the grammar.
pub fn parse_color(input: &str) -> Option<Rgb> {
    let trimmed = input.trim();
    if trimmed
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("rgb("))
    {
        return parse_rgb_function(&trimmed[4..]);
    }
    parse_hex(trimmed.strip_prefix('#').unwrap_or(trimmed))
}

fn parse_rgb_function(args: &str) -> Option<Rgb> {
    let inner = args.strip_suffix(')')?;
    let components: Vec<u8> = inner
        .split(',')
        .map(|part| part.trim().parse::<u8>().ok())
        .collect::<Option<_>>()?;
    match components.as_slice() {
        [r, g, b] => Some(Rgb::new(*r, *g, *b)),
        _ => None,
    }
}

fn parse_hex(digits: &str) -> Option<Rgb> {
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match digits.len() {
        3 => {
            let expand = |i: usize| channel(&digits[i..=i].repeat(2));
            Some(Rgb::new(expand(0)?, expand(1)?, expand(2)?))
        }
        6 => Some(Rgb::new(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        )),
        _ => None,
    }
}

/// Resolve an optional pass color, falling back to `default` when absent or invalid.
pub fn resolve(value: Option<&str>, role: ColorRole, default: Rgb) -> Rgb {
    match value {
        None => default,
        Some(raw) => parse_color(raw).unwrap_or_else(|| {
            log::warn!(
                "{} {raw:?} is not a valid color, using {default}",
                role.manifest_key()
            );
            default
        }),
    }
}
