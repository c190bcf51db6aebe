//! Shared test utilities for the passprint test suite.
//!
//! Builds pass archives in memory so tests never depend on fixture files:
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let bytes = PassArchiveBuilder::new(json!({"eventTicket": {}}))
//!     .file("icon.png", png_bytes(29, 29))
//!     .build();
//! let pass = archive::parse(&bytes).unwrap();
//! ```

use crate::archive;
use crate::pass::ParsedPass;
use image::{ImageBuffer, ImageFormat, Rgba};
use serde_json::{Value, json};
use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

// =========================================================================
// Archive construction
// =========================================================================

/// In-memory `.pkpass` builder.
pub struct PassArchiveBuilder {
    files: Vec<(String, Vec<u8>)>,
}

impl PassArchiveBuilder {
    /// An archive with no `pass.json`.
    pub fn empty() -> Self {
        Self { files: Vec::new() }
    }

    /// An archive whose `pass.json` is `manifest`.
    pub fn new(manifest: Value) -> Self {
        let json = serde_json::to_vec_pretty(&manifest).unwrap();
        Self::empty().file("pass.json", json)
    }

    pub fn file(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.files.push((name.to_string(), bytes));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in &self.files {
            writer
                .start_file(name.as_str(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }
}

/// A valid PNG of the given size, filled with an opaque mid-gray.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_pixel(width, height, Rgba([128u8, 128, 128, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Normalize an archive holding only `manifest`. Panics on parse failure.
pub fn parse_manifest(manifest: Value) -> ParsedPass {
    archive::parse(&PassArchiveBuilder::new(manifest).build()).unwrap()
}

// =========================================================================
// Sample passes
// =========================================================================

/// Event ticket manifest: one header field, one primary, two secondary,
/// three auxiliary, a QR barcode with alt text, and the given back fields.
pub fn event_ticket_manifest(back_fields: &[Value]) -> Value {
    json!({
        "formatVersion": 1,
        "passTypeIdentifier": "pass.com.example.gala",
        "serialNumber": "GALA-0042",
        "teamIdentifier": "A1B2C3D4E5",
        "organizationName": "Riverside Hall",
        "description": "Spring Gala",
        "backgroundColor": "rgb(60, 79, 109)",
        "foregroundColor": "rgb(255, 255, 255)",
        "labelColor": "rgb(200, 210, 230)",
        "relevantDate": "2024-04-20T19:00:00-07:00",
        "barcodes": [{
            "message": "GALA-0042-ADMIT-ONE",
            "format": "PKBarcodeFormatQR",
            "messageEncoding": "iso-8859-1",
            "altText": "GALA-0042",
        }],
        "eventTicket": {
            "headerFields": [
                {"key": "date", "label": "DATE", "value": "Apr 20"},
            ],
            "primaryFields": [
                {"key": "event", "label": "EVENT", "value": "Spring Gala"},
            ],
            "secondaryFields": [
                {"key": "loc", "label": "LOCATION", "value": "Main Ballroom"},
                {"key": "doors", "label": "DOORS", "value": "6:30 PM"},
            ],
            "auxiliaryFields": [
                {"key": "section", "label": "SECTION", "value": "B"},
                {"key": "row", "label": "ROW", "value": 12},
                {"key": "price", "label": "PRICE", "value": 85, "currencyCode": "USD"},
            ],
            "backFields": back_fields,
        },
    })
}

/// Scenario A archive: event ticket plus icon and thumbnail images.
pub fn event_ticket_archive(back_fields: &[Value]) -> Vec<u8> {
    PassArchiveBuilder::new(event_ticket_manifest(back_fields))
        .file("icon.png", png_bytes(29, 29))
        .file("icon@2x.png", png_bytes(58, 58))
        .file("thumbnail.png", png_bytes(90, 90))
        .build()
}

/// Two short back fields that fit in place.
pub fn sample_back_fields_short() -> Vec<Value> {
    vec![
        json!({"key": "terms", "label": "TERMS", "value": "Non-refundable."}),
        json!({"key": "contact", "label": "CONTACT", "value": "info@riverside.example"}),
    ]
}

/// Enough back-field text to force a second page.
pub fn sample_back_fields_long() -> Vec<Value> {
    let paragraph = "Admission is subject to the venue's terms of entry. \
        Bags may be searched on arrival and oversized items will be refused. \
        Re-entry is not permitted once the doors have closed for the evening. \
        Photography is allowed without flash during the main programme.";
    (1..=6)
        .map(|i| {
            json!({
                "key": format!("notice{i}"),
                "label": format!("NOTICE {i}"),
                "value": paragraph,
            })
        })
        .collect()
}
