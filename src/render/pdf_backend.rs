//! PDF backend built on `lopdf`.
//!
//! Document structure:
//!
//! ```text
//! Catalog ─► Pages ─► Page 1 ─► Contents (operators)
//!                  └► Page 2 ─► Contents
//! every page ─► shared Resources: /Font F1 F2, /XObject Im0 Im1 …
//! ```
//!
//! Fonts are the standard-14 Helvetica faces with `WinAnsiEncoding`, so
//! nothing is embedded. Images become Flate-compressed XObjects; an alpha
//! channel is split into a grayscale soft mask.

use super::backend::{BackendError, DocumentBackend, ImageHandle};
use super::geometry::Rect;
use super::text::{Font, encode_win_ansi};
use crate::color::Rgb;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::GrayImage;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use std::io::Write;

const PDF_VERSION: &str = "1.5";

/// Page being drawn: its size and the operators issued so far.
struct OpenPage {
    width: f32,
    height: f32,
    operations: Vec<Operation>,
}

pub struct PdfBackend {
    doc: Document,
    pages_id: ObjectId,
    finished_pages: Vec<(f32, f32, Vec<Operation>)>,
    current: Option<OpenPage>,
    images: Vec<ObjectId>,
}

impl PdfBackend {
    pub fn new() -> Self {
        let mut doc = Document::with_version(PDF_VERSION);
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            finished_pages: Vec::new(),
            current: None,
            images: Vec::new(),
        }
    }

    fn push(&mut self, operation: Operation) {
        match self.current.as_mut() {
            Some(page) => page.operations.push(operation),
            None => log::warn!("drawing before the first page: {}", operation.operator),
        }
    }

    fn push_all(&mut self, operations: impl IntoIterator<Item = Operation>) {
        for operation in operations {
            self.push(operation);
        }
    }

    fn add_image_object(
        &mut self,
        width: u32,
        height: u32,
        color_space: &str,
        pixels: &[u8],
        soft_mask: Option<ObjectId>,
    ) -> ImageHandle {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8_i64,
        };
        if let Some(mask_id) = soft_mask {
            dict.set("SMask", mask_id);
        }
        let id = self.doc.add_object(image_stream(dict, pixels));
        self.images.push(id);
        ImageHandle {
            id: self.images.len() - 1,
            width,
            height,
        }
    }

    fn shared_resources(&mut self) -> ObjectId {
        let mut fonts = Dictionary::new();
        for font in [Font::Regular, Font::Bold] {
            let font_id = self.doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource_name(), font_id);
        }

        let mut xobjects = Dictionary::new();
        for (index, id) in self.images.iter().enumerate() {
            xobjects.set(image_name(index), *id);
        }

        self.doc.add_object(dictionary! {
            "Font" => fonts,
            "XObject" => xobjects,
        })
    }
}

impl Default for PdfBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn image_name(index: usize) -> String {
    format!("Im{index}")
}

fn color_operands(color: Rgb) -> Vec<Object> {
    color.to_unit().into_iter().map(Object::from).collect()
}

fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Image stream, Flate-compressed when possible.
fn image_stream(mut dict: Dictionary, pixels: &[u8]) -> Stream {
    match deflate(pixels) {
        Ok(compressed) => {
            dict.set("Filter", "FlateDecode");
            Stream::new(dict, compressed).with_compression(false)
        }
        Err(e) => {
            log::warn!("image compression failed, storing raw pixels: {e}");
            Stream::new(dict, pixels.to_vec()).with_compression(false)
        }
    }
}

impl DocumentBackend for PdfBackend {
    fn begin_page(&mut self, width: f32, height: f32) {
        if let Some(page) = self.current.take() {
            self.finished_pages
                .push((page.width, page.height, page.operations));
        }
        self.current = Some(OpenPage {
            width,
            height,
            operations: Vec::new(),
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.push_all([
            Operation::new("rg", color_operands(color)),
            Operation::new(
                "re",
                vec![
                    rect.x.into(),
                    rect.y.into(),
                    rect.width.into(),
                    rect.height.into(),
                ],
            ),
            Operation::new("f", vec![]),
        ]);
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb) {
        self.push_all([
            Operation::new("w", vec![width.into()]),
            Operation::new("RG", color_operands(color)),
            Operation::new("m", vec![from.0.into(), from.1.into()]),
            Operation::new("l", vec![to.0.into(), to.1.into()]),
            Operation::new("S", vec![]),
        ]);
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font: Font, size: f32, color: Rgb) {
        if text.is_empty() {
            return;
        }
        self.push_all([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.resource_name().into(), size.into()]),
            Operation::new("rg", color_operands(color)),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(encode_win_ansi(text))]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn embed_image(&mut self, bytes: &[u8]) -> Result<ImageHandle, BackendError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| BackendError::UnsupportedImage(e.to_string()))?;
        let (width, height) = (decoded.width(), decoded.height());
        if width == 0 || height == 0 {
            return Err(BackendError::UnsupportedImage("image has no pixels".into()));
        }

        if decoded.color().has_alpha() {
            let rgba = decoded.to_rgba8();
            let pixel_count = width as usize * height as usize;
            let mut rgb = Vec::with_capacity(pixel_count * 3);
            let mut alpha = Vec::with_capacity(pixel_count);
            for pixel in rgba.pixels() {
                rgb.extend_from_slice(&pixel.0[..3]);
                alpha.push(pixel.0[3]);
            }
            let mask_dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8_i64,
            };
            let mask_id = self.doc.add_object(image_stream(mask_dict, &alpha));
            Ok(self.add_image_object(width, height, "DeviceRGB", &rgb, Some(mask_id)))
        } else {
            let rgb = decoded.to_rgb8();
            Ok(self.add_image_object(width, height, "DeviceRGB", rgb.as_raw(), None))
        }
    }

    fn embed_bitmap(&mut self, bitmap: &GrayImage) -> ImageHandle {
        self.add_image_object(
            bitmap.width(),
            bitmap.height(),
            "DeviceGray",
            bitmap.as_raw(),
            None,
        )
    }

    fn draw_image(&mut self, handle: ImageHandle, rect: Rect, clip: Option<Rect>) {
        let mut ops = vec![Operation::new("q", vec![])];
        if let Some(clip) = clip {
            ops.extend([
                Operation::new(
                    "re",
                    vec![
                        clip.x.into(),
                        clip.y.into(),
                        clip.width.into(),
                        clip.height.into(),
                    ],
                ),
                Operation::new("W", vec![]),
                Operation::new("n", vec![]),
            ]);
        }
        ops.extend([
            Operation::new(
                "cm",
                vec![
                    rect.width.into(),
                    0.0_f32.into(),
                    0.0_f32.into(),
                    rect.height.into(),
                    rect.x.into(),
                    rect.y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(image_name(handle.id).into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        self.push_all(ops);
    }

    fn page_count(&self) -> usize {
        self.finished_pages.len() + usize::from(self.current.is_some())
    }

    fn finish(mut self) -> Result<Vec<u8>, BackendError> {
        if let Some(page) = self.current.take() {
            self.finished_pages
                .push((page.width, page.height, page.operations));
        }
        if self.finished_pages.is_empty() {
            return Err(BackendError::Serialize("document has no pages".into()));
        }

        let resources_id = self.shared_resources();
        let mut kids = Vec::with_capacity(self.finished_pages.len());
        for (width, height, operations) in std::mem::take(&mut self.finished_pages) {
            let content = Content { operations }
                .encode()
                .map_err(|e| BackendError::Serialize(e.to_string()))?;
            let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));
            let page_id = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => self.pages_id,
                "MediaBox" => vec![0_i64.into(), 0_i64.into(), width.into(), height.into()],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(Object::from(page_id));
        }

        let page_count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| BackendError::Serialize(e.to_string()))?;
        Ok(bytes)
    }
}
