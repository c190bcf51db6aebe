//! Archive normalization: `.pkpass` bytes → [`ParsedPass`].
//!
//! A pass archive is a ZIP container with a `pass.json` manifest at its root
//! and PNG assets next to it:
//!
//! ```text
//! Event.pkpass
//! ├── pass.json            # manifest (required)
//! ├── icon.png             # base resolution
//! ├── icon@2x.png          # double density
//! ├── thumbnail@3x.png     # triple density
//! ├── manifest.json        # asset hashes (ignored)
//! └── signature            # PKCS#7 signature (ignored)
//! ```
//!
//! ## Normalization rules
//!
//! - **Style**: the first of `boardingPass`, `coupon`, `eventTicket`,
//!   `generic`, `storeCard` present as an object on the root wins. No style
//!   key means `generic`. Several style keys is not an error.
//! - **Fields**: the style object's five `*Fields` arrays; missing arrays
//!   become empty sections. Individual fields that cannot be normalized are
//!   dropped with a warning rather than failing the pass.
//! - **Barcode**: first entry of `barcodes`, then legacy `barcode`, then none.
//! - **Images**: for each role, `@3x` beats `@2x` beats the base file. The
//!   file name is trusted; payloads are never decoded here.
//!
//! Parsing is a pure function of the input bytes.

use crate::pass::{
    Barcode, BarcodeFormat, DateStyle, Field, FieldSections, FieldValue, ImageRole, ImageSet,
    NumberStyle, ParsedPass, PassStyle, TextAlignment, TransitType,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::io::{Cursor, Read};
use std::path::Path;
use thiserror::Error;
use zip::ZipArchive;
use zip::result::ZipError;

/// Name of the manifest entry inside the archive.
pub const MANIFEST_NAME: &str = "pass.json";

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not a valid pass archive: {0}")]
    InvalidArchive(ZipError),
    #[error("Pass archive has no pass.json")]
    MissingManifest,
    #[error("Malformed pass.json: {0}")]
    MalformedManifest(String),
}

/// Read a pass archive from disk and normalize it.
pub fn parse_file(path: &Path) -> Result<ParsedPass, FormatError> {
    let bytes = std::fs::read(path)?;
    parse(&bytes)
}

/// Normalize a pass archive held in memory.
pub fn parse(bytes: &[u8]) -> Result<ParsedPass, FormatError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(FormatError::InvalidArchive)?;

    let manifest = read_manifest(&mut archive)?;
    let root = manifest
        .as_object()
        .ok_or_else(|| FormatError::MalformedManifest("root is not a JSON object".into()))?;

    let (style, style_object) = detect_style(root);
    log::debug!("detected pass style {}", style.manifest_key());

    let fields = style_object.map(extract_sections).unwrap_or_default();
    let barcode = select_barcode(root);
    let images = extract_images(&mut archive);

    Ok(ParsedPass {
        style,
        organization_name: scalar_string(root, "organizationName").unwrap_or_default(),
        description: scalar_string(root, "description").unwrap_or_default(),
        logo_text: scalar_string(root, "logoText"),
        serial_number: scalar_string(root, "serialNumber"),
        fields,
        barcode,
        images,
        foreground_color: scalar_string(root, "foregroundColor"),
        background_color: scalar_string(root, "backgroundColor"),
        label_color: scalar_string(root, "labelColor"),
        relevant_date: scalar_string(root, "relevantDate"),
        expiration_date: scalar_string(root, "expirationDate"),
        raw: manifest,
    })
}

fn read_manifest(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<Value, FormatError> {
    let mut entry = match archive.by_name(MANIFEST_NAME) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Err(FormatError::MissingManifest),
        Err(e) => return Err(FormatError::InvalidArchive(e)),
    };
    let mut content = Vec::new();
    entry.read_to_end(&mut content)?;

    // Some pass generators emit a UTF-8 byte order mark.
    let json = content
        .strip_prefix(b"\xEF\xBB\xBF")
        .unwrap_or(content.as_slice());
    serde_json::from_slice(json).map_err(|e| FormatError::MalformedManifest(e.to_string()))
}

/// Pick the pass style and the sub-object carrying its fields.
fn detect_style(root: &Map<String, Value>) -> (PassStyle, Option<&Map<String, Value>>) {
    for key in PassStyle::DETECTION_ORDER {
        let Some(object) = root.get(key).and_then(Value::as_object) else {
            continue;
        };
        let style = match key {
            "boardingPass" => PassStyle::BoardingPass {
                transit_type: object
                    .get("transitType")
                    .and_then(Value::as_str)
                    .map(TransitType::parse),
            },
            "coupon" => PassStyle::Coupon,
            "eventTicket" => PassStyle::EventTicket,
            "storeCard" => PassStyle::StoreCard,
            _ => PassStyle::Generic,
        };
        return (style, Some(object));
    }
    (PassStyle::Generic, None)
}

fn extract_sections(style_object: &Map<String, Value>) -> FieldSections {
    FieldSections {
        header: extract_fields(style_object, "headerFields"),
        primary: extract_fields(style_object, "primaryFields"),
        secondary: extract_fields(style_object, "secondaryFields"),
        auxiliary: extract_fields(style_object, "auxiliaryFields"),
        back: extract_fields(style_object, "backFields"),
    }
}

/// Field dictionary as it appears in `pass.json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    key: String,
    #[serde(default)]
    label: Option<String>,
    value: Value,
    #[serde(default)]
    currency_code: Option<String>,
    #[serde(default)]
    date_style: Option<String>,
    #[serde(default)]
    time_style: Option<String>,
    #[serde(default)]
    number_style: Option<String>,
    #[serde(default)]
    text_alignment: Option<String>,
}

fn extract_fields(style_object: &Map<String, Value>, section: &str) -> Vec<Field> {
    let Some(entries) = style_object.get(section).and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match normalize_field(entry) {
            Ok(field) => Some(field),
            Err(reason) => {
                log::warn!("skipping {section}[{index}]: {reason}");
                None
            }
        })
        .collect()
}

fn normalize_field(entry: &Value) -> Result<Field, String> {
    let raw: RawField = serde_json::from_value(entry.clone()).map_err(|e| e.to_string())?;
    let value = match raw.value {
        Value::Number(n) => FieldValue::Number(
            n.as_f64()
                .ok_or_else(|| format!("value of '{}' is out of range", raw.key))?,
        ),
        Value::String(s) => FieldValue::Text(s),
        Value::Bool(b) => FieldValue::Text(b.to_string()),
        _ => return Err(format!("value of '{}' is not a number or string", raw.key)),
    };
    Ok(Field {
        key: raw.key,
        label: raw.label,
        value,
        currency_code: raw.currency_code,
        date_style: raw.date_style.as_deref().and_then(DateStyle::parse),
        time_style: raw.time_style.as_deref().and_then(DateStyle::parse),
        number_style: raw.number_style.as_deref().and_then(NumberStyle::parse),
        text_alignment: raw
            .text_alignment
            .as_deref()
            .map(TextAlignment::parse)
            .unwrap_or_default(),
    })
}

/// Barcode dictionary as it appears in `pass.json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBarcode {
    message: String,
    format: String,
    #[serde(default)]
    alt_text: Option<String>,
    #[serde(default)]
    message_encoding: Option<String>,
}

/// Modern `barcodes[0]` wins over legacy `barcode`; either may be absent.
fn select_barcode(root: &Map<String, Value>) -> Option<Barcode> {
    let modern = root
        .get("barcodes")
        .and_then(Value::as_array)
        .and_then(|list| list.first())
        .and_then(|entry| normalize_barcode(entry, "barcodes[0]"));
    if modern.is_some() {
        log::debug!("using barcodes[0]");
        return modern;
    }
    let legacy = root
        .get("barcode")
        .and_then(|entry| normalize_barcode(entry, "barcode"));
    if legacy.is_some() {
        log::debug!("using legacy barcode");
    }
    legacy
}

fn normalize_barcode(entry: &Value, source: &str) -> Option<Barcode> {
    let raw: RawBarcode = match serde_json::from_value(entry.clone()) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("ignoring {source}: {e}");
            return None;
        }
    };
    let Some(format) = BarcodeFormat::parse(&raw.format) else {
        log::warn!("ignoring {source}: unknown format '{}'", raw.format);
        return None;
    };
    Some(Barcode {
        message: raw.message,
        format,
        alt_text: raw.alt_text,
        encoding: raw.message_encoding,
    })
}

/// Candidate file names for a role, best resolution first.
pub fn variant_names(role: ImageRole) -> [String; 3] {
    let stem = role.file_stem();
    [
        format!("{stem}@3x.png"),
        format!("{stem}@2x.png"),
        format!("{stem}.png"),
    ]
}

fn extract_images(archive: &mut ZipArchive<Cursor<&[u8]>>) -> ImageSet {
    let mut images = ImageSet::default();
    for role in ImageRole::ALL {
        for name in variant_names(role) {
            let Ok(mut entry) = archive.by_name(&name) else {
                continue;
            };
            let mut bytes = Vec::new();
            match entry.read_to_end(&mut bytes) {
                Ok(_) => {
                    log::debug!("{} image: {name}", role.file_stem());
                    images.insert(role, bytes);
                    break;
                }
                Err(e) => log::warn!("unreadable archive entry {name}: {e}"),
            }
        }
    }
    images
}

/// String-valued key, with numbers stringified (serial numbers are often numeric).
fn scalar_string(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use serde_json::json;

    #[test]
    fn not_a_zip_is_invalid_archive() {
        let result = parse(b"definitely not a zip file");
        assert!(matches!(result, Err(FormatError::InvalidArchive(_))));
    }

    #[test]
    fn missing_manifest_is_reported() {
        let bytes = PassArchiveBuilder::empty()
            .file("icon.png", png_bytes(4, 4))
            .build();
        assert!(matches!(parse(&bytes), Err(FormatError::MissingManifest)));
    }

    #[test]
    fn manifest_that_is_not_json_is_malformed() {
        let bytes = PassArchiveBuilder::empty()
            .file("pass.json", b"{ \"organizationName\": ".to_vec())
            .build();
        let err = parse(&bytes).unwrap_err();
        assert!(matches!(err, FormatError::MalformedManifest(_)));
        assert!(err.to_string().starts_with("Malformed pass.json"));
    }

    #[test]
    fn manifest_root_must_be_an_object() {
        let bytes = PassArchiveBuilder::new(json!(["not", "an", "object"])).build();
        assert!(matches!(
            parse(&bytes),
            Err(FormatError::MalformedManifest(_))
        ));
    }

    #[test]
    fn byte_order_mark_is_tolerated() {
        let mut content = b"\xEF\xBB\xBF".to_vec();
        content.extend_from_slice(br#"{"organizationName": "BOM Air"}"#);
        let bytes = PassArchiveBuilder::empty().file("pass.json", content).build();
        let pass = parse(&bytes).unwrap();
        assert_eq!(pass.organization_name, "BOM Air");
    }

    #[test]
    fn no_style_key_defaults_to_generic() {
        let bytes = PassArchiveBuilder::new(json!({"organizationName": "Plain"})).build();
        let pass = parse(&bytes).unwrap();
        assert_eq!(pass.style, PassStyle::Generic);
        assert_eq!(pass.fields, FieldSections::default());
    }

    #[test]
    fn style_priority_picks_first_in_order() {
        let bytes = PassArchiveBuilder::new(json!({
            "storeCard": {"primaryFields": [{"key": "s", "value": "store"}]},
            "coupon": {"primaryFields": [{"key": "c", "value": "coupon"}]},
        }))
        .build();
        let pass = parse(&bytes).unwrap();
        assert_eq!(pass.style, PassStyle::Coupon);
        assert_eq!(pass.fields.primary[0].key, "c");
    }

    #[test]
    fn non_object_style_key_is_ignored() {
        let bytes = PassArchiveBuilder::new(json!({
            "boardingPass": "nope",
            "eventTicket": {},
        }))
        .build();
        assert_eq!(parse(&bytes).unwrap().style, PassStyle::EventTicket);
    }

    #[test]
    fn transit_type_read_for_boarding_pass() {
        let bytes = PassArchiveBuilder::new(json!({
            "boardingPass": {"transitType": "PKTransitTypeAir"},
        }))
        .build();
        let pass = parse(&bytes).unwrap();
        assert_eq!(pass.transit_type(), Some(&TransitType::Air));
    }

    #[test]
    fn transit_type_ignored_for_other_styles() {
        let bytes = PassArchiveBuilder::new(json!({
            "eventTicket": {"transitType": "PKTransitTypeAir"},
        }))
        .build();
        let pass = parse(&bytes).unwrap();
        assert_eq!(pass.transit_type(), None);
    }

    #[test]
    fn absent_sections_are_empty() {
        let bytes = PassArchiveBuilder::new(json!({
            "eventTicket": {"primaryFields": [{"key": "event", "label": "EVENT", "value": "Gala"}]},
        }))
        .build();
        let pass = parse(&bytes).unwrap();
        assert_eq!(pass.fields.primary.len(), 1);
        assert!(pass.fields.header.is_empty());
        assert!(pass.fields.secondary.is_empty());
        assert!(pass.fields.auxiliary.is_empty());
        assert!(pass.fields.back.is_empty());
    }

    #[test]
    fn field_hints_are_normalized() {
        let bytes = PassArchiveBuilder::new(json!({
            "storeCard": {
                "primaryFields": [{
                    "key": "balance",
                    "label": "BALANCE",
                    "value": 21.75,
                    "currencyCode": "USD",
                    "textAlignment": "PKTextAlignmentRight",
                }],
                "secondaryFields": [{
                    "key": "since",
                    "value": "2023-05-01T19:00-07:00",
                    "dateStyle": "PKDateStyleMedium",
                    "timeStyle": "PKDateStyleBogus",
                }],
            },
        }))
        .build();
        let pass = parse(&bytes).unwrap();

        let balance = &pass.fields.primary[0];
        assert_eq!(balance.value, FieldValue::Number(21.75));
        assert_eq!(balance.currency_code.as_deref(), Some("USD"));
        assert_eq!(balance.text_alignment, TextAlignment::Right);

        let since = &pass.fields.secondary[0];
        assert_eq!(since.label, None);
        assert_eq!(since.date_style, Some(DateStyle::Medium));
        assert_eq!(since.time_style, None);
    }

    #[test]
    fn unusable_fields_are_dropped_not_fatal() {
        let bytes = PassArchiveBuilder::new(json!({
            "generic": {
                "backFields": [
                    {"label": "no key", "value": "x"},
                    {"key": "nested", "value": {"a": 1}},
                    {"key": "flag", "value": true},
                    {"key": "ok", "value": "fine"},
                ],
            },
        }))
        .build();
        let pass = parse(&bytes).unwrap();
        let keys: Vec<&str> = pass.fields.back.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["flag", "ok"]);
        assert_eq!(pass.fields.back[0].value, FieldValue::Text("true".into()));
    }

    #[test]
    fn modern_barcode_wins_over_legacy() {
        let bytes = PassArchiveBuilder::new(json!({
            "barcode": {"message": "legacy", "format": "PKBarcodeFormatPDF417", "messageEncoding": "iso-8859-1"},
            "barcodes": [
                {"message": "modern", "format": "PKBarcodeFormatQR", "altText": "M-1"},
                {"message": "second", "format": "PKBarcodeFormatAztec"},
            ],
        }))
        .build();
        let barcode = parse(&bytes).unwrap().barcode.unwrap();
        assert_eq!(barcode.message, "modern");
        assert_eq!(barcode.format, BarcodeFormat::Qr);
        assert_eq!(barcode.alt_text.as_deref(), Some("M-1"));
    }

    #[test]
    fn empty_barcodes_falls_back_to_legacy() {
        let bytes = PassArchiveBuilder::new(json!({
            "barcode": {"message": "legacy", "format": "PKBarcodeFormatPDF417", "messageEncoding": "iso-8859-1"},
            "barcodes": [],
        }))
        .build();
        let barcode = parse(&bytes).unwrap().barcode.unwrap();
        assert_eq!(barcode.message, "legacy");
        assert_eq!(barcode.format, BarcodeFormat::Pdf417);
        assert_eq!(barcode.encoding.as_deref(), Some("iso-8859-1"));
    }

    #[test]
    fn unknown_barcode_format_falls_through() {
        let bytes = PassArchiveBuilder::new(json!({
            "barcodes": [{"message": "x", "format": "PKBarcodeFormatEAN13"}],
        }))
        .build();
        assert_eq!(parse(&bytes).unwrap().barcode, None);
    }

    #[test]
    fn no_barcode_entries_means_none() {
        let bytes = PassArchiveBuilder::new(json!({"generic": {}})).build();
        assert_eq!(parse(&bytes).unwrap().barcode, None);
    }

    #[test]
    fn image_resolution_priority() {
        let base = vec![1u8];
        let double = vec![2u8];
        let triple = vec![3u8];
        let bytes = PassArchiveBuilder::new(json!({}))
            .file("logo.png", base.clone())
            .file("logo@2x.png", double.clone())
            .file("icon.png", base.clone())
            .file("icon@2x.png", double.clone())
            .file("icon@3x.png", triple.clone())
            .file("strip.png", base.clone())
            .build();
        let pass = parse(&bytes).unwrap();
        assert_eq!(pass.images.get(ImageRole::Logo), Some(double.as_slice()));
        assert_eq!(pass.images.get(ImageRole::Icon), Some(triple.as_slice()));
        assert_eq!(pass.images.get(ImageRole::Strip), Some(base.as_slice()));
        assert_eq!(pass.images.get(ImageRole::Footer), None);
    }

    #[test]
    fn every_role_prefers_double_over_base() {
        let mut builder = PassArchiveBuilder::new(json!({}));
        for role in ImageRole::ALL {
            let [_, double, base] = variant_names(role);
            builder = builder.file(&base, vec![1]).file(&double, vec![2]);
        }
        let pass = parse(&builder.build()).unwrap();
        for role in ImageRole::ALL {
            assert_eq!(pass.images.get(role), Some(&[2u8][..]), "{role:?}");
        }
    }

    #[test]
    fn localized_images_are_not_picked_up() {
        let bytes = PassArchiveBuilder::new(json!({}))
            .file("en.lproj/logo.png", vec![9])
            .build();
        assert!(parse(&bytes).unwrap().images.is_empty());
    }

    #[test]
    fn top_level_values_copied_verbatim() {
        let bytes = PassArchiveBuilder::new(json!({
            "organizationName": "Paw Planet",
            "description": "Pet spa coupon",
            "logoText": "Paw Planet",
            "serialNumber": 123456,
            "foregroundColor": "rgb(255, 255, 255)",
            "backgroundColor": "#3c4f6d",
            "labelColor": "not-a-color",
            "relevantDate": "2024-02-10T10:00:00Z",
            "expirationDate": "2024-03-01",
            "coupon": {},
        }))
        .build();
        let pass = parse(&bytes).unwrap();
        assert_eq!(pass.organization_name, "Paw Planet");
        assert_eq!(pass.description, "Pet spa coupon");
        assert_eq!(pass.logo_text.as_deref(), Some("Paw Planet"));
        assert_eq!(pass.serial_number.as_deref(), Some("123456"));
        assert_eq!(pass.foreground_color.as_deref(), Some("rgb(255, 255, 255)"));
        assert_eq!(pass.background_color.as_deref(), Some("#3c4f6d"));
        assert_eq!(pass.label_color.as_deref(), Some("not-a-color"));
        assert_eq!(pass.relevant_date.as_deref(), Some("2024-02-10T10:00:00Z"));
        assert_eq!(pass.expiration_date.as_deref(), Some("2024-03-01"));
        assert_eq!(pass.raw["serialNumber"], json!(123456));
    }

    #[test]
    fn parsing_is_idempotent() {
        let bytes = event_ticket_archive(&sample_back_fields_short());
        let first = parse(&bytes).unwrap();
        let second = parse(&bytes).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn parse_file_reads_from_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("ticket.pkpass");
        std::fs::write(&path, event_ticket_archive(&sample_back_fields_short())).unwrap();
        let pass = parse_file(&path).unwrap();
        assert_eq!(pass.style, PassStyle::EventTicket);

        let missing = parse_file(&tmp.path().join("nope.pkpass"));
        assert!(matches!(missing, Err(FormatError::Io(_))));
    }
}
