//! # passprint
//!
//! Turns wallet pass archives (`.pkpass`) into printable PDF documents that
//! look like the pass does on a phone: colors, logo, field grids, barcode,
//! and the "back of the card" details.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Normalize   .pkpass bytes  →  ParsedPass     (zip + loosely typed JSON → strict types)
//! 2. Render      ParsedPass     →  PDF bytes      (cursor-driven layout, 1 or 2 pages)
//! ```
//!
//! The two stages share nothing but [`pass::ParsedPass`]. Normalization is a
//! pure function of the archive bytes and never decodes images; rendering
//! never sees JSON. Either stage can be tested without the other.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pass`] | The normalized data model: styles, fields, barcode, images |
//! | [`archive`] | Stage 1: opens the ZIP, parses `pass.json`, picks style, barcode, and image variants |
//! | [`render`] | Stage 2: layout state machine over a [`render::DocumentBackend`], PDF via `lopdf` |
//! | [`barcode`] | QR bitmap generation for the barcode block |
//! | [`format`] | Currency, number, and date formatting for field values |
//! | [`color`] | `rgb()` / hex color grammar with per-role fallbacks |
//! | [`config`] | `passprint.toml`: every layout constant in one place |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Degrade, Don't Fail
//!
//! Only a broken archive is an error. A bad color falls back to the default,
//! an undecodable image is skipped, an unparseable date prints verbatim, a
//! barcode message that doesn't fit a QR symbol keeps its caption. Each of
//! these is logged at `warn` so `-v` shows what was dropped.
//!
//! ## Resolution by File Name
//!
//! `logo@3x.png` beats `logo@2x.png` beats `logo.png`, decided by name alone.
//! The archive format guarantees the correspondence, so the normalizer never
//! needs an image decoder.
//!
//! ## Standard Fonts Only
//!
//! Text is set in the PDF base-14 Helvetica faces with `WinAnsiEncoding`.
//! Nothing is embedded, so output stays small; characters outside the
//! encoding print as `?`.

pub mod archive;
pub mod barcode;
pub mod color;
pub mod config;
pub mod format;
pub mod output;
pub mod pass;
pub mod render;

#[cfg(test)]
pub(crate) mod test_helpers;
