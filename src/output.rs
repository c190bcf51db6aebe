//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! ## Inspect
//!
//! ```text
//! Event Ticket: Riverside Hall
//!     Description: Spring Gala
//!     Serial: GALA-0042
//!     Relevant: Apr 20, 2024, 7:00 PM
//! Header
//!     DATE: Apr 20
//! Auxiliary
//!     PRICE: $85.00
//! Barcode
//!     QR: GALA-0042-ADMIT-ONE
//!     Alt text: GALA-0042
//! Images
//!     icon, thumbnail
//! Colors
//!     background: rgb(60, 79, 109)
//! ```
//!
//! ## Convert
//!
//! ```text
//! gala.pkpass → gala.pdf
//!     Pages: 2
//!     Barcode: drawn
//!     Back fields: 6 on page 2
//! ```

use crate::format::{format_field_value, format_relevant_date};
use crate::pass::{Field, ParsedPass};
use crate::render::{BackPlacement, RenderSummary};
use std::path::Path;

const INDENT: &str = "    ";

fn field_line(field: &Field) -> String {
    let name = field.label.as_deref().unwrap_or(&field.key);
    let value = format_field_value(field).replace('\n', " ");
    format!("{INDENT}{name}: {value}")
}

/// Normalized pass, section by section. Empty sections are skipped.
pub fn format_pass_summary(pass: &ParsedPass) -> Vec<String> {
    let mut lines = Vec::new();

    let heading = if pass.organization_name.is_empty() {
        pass.style.display_label().to_string()
    } else {
        format!("{}: {}", pass.style.display_label(), pass.organization_name)
    };
    lines.push(heading);
    if !pass.description.is_empty() {
        lines.push(format!("{INDENT}Description: {}", pass.description));
    }
    if let Some(serial) = &pass.serial_number {
        lines.push(format!("{INDENT}Serial: {serial}"));
    }
    if let Some(raw) = &pass.relevant_date {
        let shown = format_relevant_date(raw).unwrap_or_else(|| raw.clone());
        lines.push(format!("{INDENT}Relevant: {shown}"));
    }
    if let Some(raw) = &pass.expiration_date {
        lines.push(format!("{INDENT}Expires: {raw}"));
    }

    let sections = [
        ("Header", &pass.fields.header),
        ("Primary", &pass.fields.primary),
        ("Secondary", &pass.fields.secondary),
        ("Auxiliary", &pass.fields.auxiliary),
        ("Back", &pass.fields.back),
    ];
    for (title, fields) in sections {
        if fields.is_empty() {
            continue;
        }
        lines.push(title.to_string());
        lines.extend(fields.iter().map(field_line));
    }

    if let Some(barcode) = &pass.barcode {
        lines.push("Barcode".to_string());
        lines.push(format!(
            "{INDENT}{}: {}",
            barcode.format.display_name(),
            barcode.message
        ));
        if let Some(alt) = &barcode.alt_text {
            lines.push(format!("{INDENT}Alt text: {alt}"));
        }
    }

    if !pass.images.is_empty() {
        lines.push("Images".to_string());
        let roles: Vec<&str> = pass.images.roles().map(|r| r.file_stem()).collect();
        lines.push(format!("{INDENT}{}", roles.join(", ")));
    }

    let colors = [
        ("background", &pass.background_color),
        ("foreground", &pass.foreground_color),
        ("label", &pass.label_color),
    ];
    if colors.iter().any(|(_, value)| value.is_some()) {
        lines.push("Colors".to_string());
        for (role, value) in colors {
            if let Some(value) = value {
                lines.push(format!("{INDENT}{role}: {value}"));
            }
        }
    }

    lines
}

pub fn print_pass_summary(pass: &ParsedPass) {
    for line in format_pass_summary(pass) {
        println!("{line}");
    }
}

/// Result of a `convert` run.
pub fn format_convert_summary(input: &Path, output: &Path, summary: &RenderSummary) -> Vec<String> {
    let mut lines = vec![
        format!("{} → {}", input.display(), output.display()),
        format!("{INDENT}Pages: {}", summary.pages),
        format!(
            "{INDENT}Barcode: {}",
            if summary.barcode_rendered { "drawn" } else { "none" }
        ),
    ];
    if summary.back_placement != BackPlacement::None {
        let mut back = format!(
            "{INDENT}Back fields: {} on {}",
            summary.back_fields_rendered, summary.back_placement
        );
        if summary.back_fields_omitted > 0 {
            back.push_str(&format!(" ({} omitted)", summary.back_fields_omitted));
        }
        lines.push(back);
    }
    lines
}

pub fn print_convert_summary(input: &Path, output: &Path, summary: &RenderSummary) {
    for line in format_convert_summary(input, output, summary) {
        println!("{line}");
    }
}
