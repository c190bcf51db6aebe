#![allow(dead_code)]

use image::{ImageBuffer, ImageFormat, Rgba};
use serde_json::{Value, json};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Zip `files` into an in-memory archive.
pub fn zip_archive(files: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in files {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start zip entry");
        writer.write_all(bytes).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_pixel(width, height, Rgba([30u8, 60, 90, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("encode png");
    out.into_inner()
}

pub fn manifest_bytes(manifest: &Value) -> Vec<u8> {
    serde_json::to_vec(manifest).expect("serialize manifest")
}

/// Event ticket with 1 header, 1 primary, 2 secondary, 3 auxiliary fields,
/// a QR barcode with alt text, and the given back fields.
pub fn event_ticket(back_fields: Vec<Value>) -> Value {
    json!({
        "formatVersion": 1,
        "serialNumber": "E-1138",
        "organizationName": "Harbor Theatre",
        "description": "Opening Night",
        "backgroundColor": "rgb(20, 30, 48)",
        "foregroundColor": "rgb(255, 255, 255)",
        "relevantDate": "2024-09-14T19:30:00+01:00",
        "barcodes": [{
            "message": "E-1138-ORCH-C-7",
            "format": "PKBarcodeFormatQR",
            "messageEncoding": "iso-8859-1",
            "altText": "E-1138",
        }],
        "eventTicket": {
            "headerFields": [{"key": "date", "label": "DATE", "value": "Sep 14"}],
            "primaryFields": [{"key": "show", "label": "SHOW", "value": "The Tempest"}],
            "secondaryFields": [
                {"key": "venue", "label": "VENUE", "value": "Harbor Theatre"},
                {"key": "time", "label": "CURTAIN", "value": "7:30 PM"},
            ],
            "auxiliaryFields": [
                {"key": "section", "label": "SECTION", "value": "Orchestra"},
                {"key": "row", "label": "ROW", "value": "C"},
                {"key": "seat", "label": "SEAT", "value": 7},
            ],
            "backFields": back_fields,
        },
    })
}

pub fn short_back_fields() -> Vec<Value> {
    vec![
        json!({"key": "policy", "label": "POLICY", "value": "No refunds or exchanges."}),
        json!({"key": "help", "label": "HELP", "value": "boxoffice@harbor.example"}),
    ]
}

pub fn long_back_fields() -> Vec<Value> {
    let text = "Latecomers will be admitted at a suitable break in the performance. \
        Running time is approximately two hours and forty minutes including one interval. \
        Please switch off mobile phones and other devices before the performance begins. \
        The theatre reserves the right to make alterations to the advertised cast.";
    (1..=6)
        .map(|i| json!({"key": format!("info{i}"), "label": format!("INFO {i}"), "value": text}))
        .collect()
}

/// Archive with the manifest plus an icon/thumbnail pair.
pub fn archive_with_images(manifest: &Value) -> Vec<u8> {
    zip_archive(&[
        ("pass.json", manifest_bytes(manifest)),
        ("icon.png", png_bytes(29, 29)),
        ("icon@2x.png", png_bytes(58, 58)),
        ("thumbnail@2x.png", png_bytes(180, 180)),
    ])
}

pub fn write_archive(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write archive");
    path
}

/// Number of pages in a serialized PDF.
pub fn page_count(pdf: &[u8]) -> usize {
    lopdf::Document::load_mem(pdf).expect("valid pdf").get_pages().len()
}
