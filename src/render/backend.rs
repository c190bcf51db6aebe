//! Document backend trait and shared types.
//!
//! The layout engine never talks to a file format directly. It issues a
//! small set of drawing calls against [`DocumentBackend`]; the production
//! implementation is [`PdfBackend`](super::pdf_backend::PdfBackend).
//!
//! | Call | Purpose |
//! |---|---|
//! | `begin_page` | start a new page (first call starts page 1) |
//! | `fill_rect` / `stroke_line` | backgrounds and separators |
//! | `draw_text` | one line of text at a baseline |
//! | `embed_image` / `embed_bitmap` | register a bitmap once, draw it by handle |
//! | `draw_image` | place a registered bitmap, optionally clipped |
//! | `finish` | serialize the document |

use super::geometry::Rect;
use super::text::{self, Font};
use crate::color::Rgb;
use image::GrayImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),
    #[error("Document serialization failed: {0}")]
    Serialize(String),
}

/// A bitmap registered with the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHandle {
    pub id: usize,
    /// Pixel dimensions, for aspect-ratio math.
    pub width: u32,
    pub height: u32,
}

impl ImageHandle {
    pub fn pixels(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Drawing surface the layout engine renders onto.
///
/// Calls arrive in document order; nothing is drawn before the first
/// `begin_page`.
pub trait DocumentBackend {
    fn begin_page(&mut self, width: f32, height: f32);

    fn fill_rect(&mut self, rect: Rect, color: Rgb);

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb);

    /// Draw a single line of text with its baseline at `y`.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, font: Font, size: f32, color: Rgb);

    fn text_width(&self, text: &str, font: Font, size: f32) -> f32 {
        text::measure(text, font, size)
    }

    /// Decode and register an encoded image (PNG or JPEG).
    fn embed_image(&mut self, bytes: &[u8]) -> Result<ImageHandle, BackendError>;

    /// Register an already-decoded grayscale bitmap.
    fn embed_bitmap(&mut self, bitmap: &GrayImage) -> ImageHandle;

    /// Draw a registered image scaled into `rect`. With `clip`, only the part
    /// inside the clip rectangle is visible.
    fn draw_image(&mut self, handle: ImageHandle, rect: Rect, clip: Option<Rect>);

    fn page_count(&self) -> usize;

    fn finish(self) -> Result<Vec<u8>, BackendError>
    where
        Self: Sized;
}
