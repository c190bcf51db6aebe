//! Matrix barcode bitmap generation.
//!
//! Every pass barcode is drawn as a QR code built from the barcode message:
//! error correction level M, a 4-module quiet zone, black modules on white,
//! always [`BARCODE_PIXELS`] square. The module size is the largest integer
//! scale that fits; leftover pixels become extra light margin so the code
//! stays centered.

use image::{GrayImage, Luma};
use qrcode::{Color, EcLevel, QrCode};
use thiserror::Error;

/// Edge length of the generated bitmap.
pub const BARCODE_PIXELS: u32 = 330;

/// Quiet zone around the symbol, in modules.
pub const QUIET_ZONE_MODULES: u32 = 4;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

#[derive(Error, Debug)]
pub enum BarcodeError {
    #[error("Barcode encoding failed: {0}")]
    Encode(String),
}

/// Encode `message` as a square QR bitmap.
pub fn encode_matrix_barcode(message: &str) -> Result<GrayImage, BarcodeError> {
    let code = QrCode::with_error_correction_level(message.as_bytes(), EcLevel::M)
        .map_err(|e| BarcodeError::Encode(e.to_string()))?;

    let modules = code.width() as u32;
    let total_modules = modules + 2 * QUIET_ZONE_MODULES;
    let scale = (BARCODE_PIXELS / total_modules).max(1);
    let symbol_pixels = modules * scale;
    if symbol_pixels > BARCODE_PIXELS {
        return Err(BarcodeError::Encode(format!(
            "{modules} modules do not fit in {BARCODE_PIXELS}px"
        )));
    }
    let offset = (BARCODE_PIXELS - symbol_pixels) / 2;

    let mut bitmap = GrayImage::from_pixel(BARCODE_PIXELS, BARCODE_PIXELS, LIGHT);
    for my in 0..modules {
        for mx in 0..modules {
            if code[(mx as usize, my as usize)] != Color::Dark {
                continue;
            }
            let x0 = offset + mx * scale;
            let y0 = offset + my * scale;
            for y in y0..y0 + scale {
                for x in x0..x0 + scale {
                    bitmap.put_pixel(x, y, DARK);
                }
            }
        }
    }
    Ok(bitmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_has_fixed_dimensions() {
        for message in ["A", "0000001", &"x".repeat(500)] {
            let bitmap = encode_matrix_barcode(message).unwrap();
            assert_eq!(bitmap.dimensions(), (BARCODE_PIXELS, BARCODE_PIXELS));
        }
    }

    #[test]
    fn quiet_zone_is_light() {
        let bitmap = encode_matrix_barcode("ticket-42").unwrap();
        for i in 0..BARCODE_PIXELS {
            assert_eq!(bitmap.get_pixel(i, 0), &LIGHT);
            assert_eq!(bitmap.get_pixel(0, i), &LIGHT);
            assert_eq!(bitmap.get_pixel(i, BARCODE_PIXELS - 1), &LIGHT);
        }
    }

    #[test]
    fn contains_dark_modules() {
        let bitmap = encode_matrix_barcode("ticket-42").unwrap();
        assert!(bitmap.pixels().any(|p| *p == DARK));
    }

    #[test]
    fn same_message_same_bitmap() {
        let a = encode_matrix_barcode("repeatable").unwrap();
        let b = encode_matrix_barcode("repeatable").unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn oversized_message_is_an_error() {
        let message = "x".repeat(5000);
        assert!(matches!(
            encode_matrix_barcode(&message),
            Err(BarcodeError::Encode(_))
        ));
    }
}
