//! The cursor state machine.
//!
//! Rendering is a fixed sequence of steps. Each step takes the current
//! vertical cursor `y` (distance from the page bottom), draws its section
//! below it, and returns the new cursor. The cursor only ever decreases;
//! the one exception is the back-field step, which may start a second page
//! and restart from the top.

use super::backend::{DocumentBackend, ImageHandle};
use super::geometry::{
    Rect, align_in_cell, centered_x, column_width, column_x, fit_logo, grid_row_advance,
    strip_placement,
};
use super::text::{self, Font, line_height};
use super::{BackPlacement, RenderSummary};
use crate::barcode::encode_matrix_barcode;
use crate::color::{ColorRole, Rgb, resolve};
use crate::config::RenderConfig;
use crate::format::{format_field_value, format_relevant_date};
use crate::pass::{Field, ImageRole, ParsedPass};

/// Heading shown above the back fields, in place or on the second page.
pub const BACK_HEADING: &str = "Additional Information";

/// Space between the logo and the logo text.
const LOGO_TEXT_GAP: f32 = 8.0;
/// Space between the barcode square (or footer image) and the caption below.
const CAPTION_GAP: f32 = 4.0;

/// Resolved colors for the whole document.
#[derive(Debug, Clone, Copy)]
struct Palette {
    background: Rgb,
    foreground: Rgb,
    label: Rgb,
}

/// Type sizes and limits for one back-field placement.
struct BackStyle {
    heading_size: f32,
    label_size: f32,
    value_size: f32,
    max_lines: Option<usize>,
    /// Lowest cursor a field may reach.
    floor: f32,
}

pub(crate) struct Layout<'a, B: DocumentBackend> {
    pass: &'a ParsedPass,
    config: &'a RenderConfig,
    backend: &'a mut B,
    palette: Palette,
    summary: RenderSummary,
    footer_drawn: bool,
}

impl<'a, B: DocumentBackend> Layout<'a, B> {
    pub fn new(pass: &'a ParsedPass, config: &'a RenderConfig, backend: &'a mut B) -> Self {
        let defaults = &config.colors;
        let palette = Palette {
            background: resolve(
                pass.background_color.as_deref(),
                ColorRole::Background,
                defaults.background_rgb(),
            ),
            foreground: resolve(
                pass.foreground_color.as_deref(),
                ColorRole::Foreground,
                defaults.foreground_rgb(),
            ),
            label: resolve(
                pass.label_color.as_deref(),
                ColorRole::Label,
                defaults.label_rgb(),
            ),
        };
        Self {
            pass,
            config,
            backend,
            palette,
            summary: RenderSummary::default(),
            footer_drawn: false,
        }
    }

    /// Section order, top to bottom.
    fn steps() -> [fn(&mut Self, f32) -> f32; 11] {
        [
            Self::header_row,
            Self::header_fields,
            Self::strip,
            Self::title,
            Self::style_label,
            Self::separator,
            Self::primary_fields,
            Self::secondary_fields,
            Self::auxiliary_fields,
            Self::barcode_block,
            Self::back_fields,
        ]
    }

    pub fn run(mut self) -> RenderSummary {
        let mut y = self.start_page();
        for step in Self::steps() {
            y = step(&mut self, y);
        }
        if !self.footer_drawn {
            self.footer();
        }
        self.summary.pages = self.backend.page_count();
        self.summary
    }

    // =========================================================================
    // Page furniture
    // =========================================================================

    /// Begin a page, fill its background, and return the top cursor.
    fn start_page(&mut self) -> f32 {
        let page = &self.config.page;
        self.backend.begin_page(page.width, page.height);
        self.backend.fill_rect(
            Rect::new(0.0, 0.0, page.width, page.height),
            self.palette.background,
        );
        page.height - page.margin
    }

    /// Serial number and relevant date along the bottom of the first page.
    fn footer(&mut self) {
        self.footer_drawn = true;
        let page = &self.config.page;
        let footer = &self.config.footer;
        let y = footer.offset;

        if let Some(serial) = &self.pass.serial_number {
            self.backend.draw_text(
                serial,
                page.margin,
                y,
                Font::Regular,
                footer.size,
                self.palette.label,
            );
        }
        let date = self
            .pass
            .relevant_date
            .as_deref()
            .and_then(format_relevant_date);
        if let Some(date) = date {
            let width = self.backend.text_width(&date, Font::Regular, footer.size);
            self.backend.draw_text(
                &date,
                page.width - page.margin - width,
                y,
                Font::Regular,
                footer.size,
                self.palette.label,
            );
        }
    }

    fn embed(&mut self, role: ImageRole) -> Option<ImageHandle> {
        let bytes = self.pass.images.get(role)?;
        match self.backend.embed_image(bytes) {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("skipping {} image: {e}", role.file_stem());
                None
            }
        }
    }

    fn content_width(&self) -> f32 {
        self.config.content_width()
    }

    // =========================================================================
    // Sections
    // =========================================================================

    /// Logo (or logo text, or organization name) on the left, thumbnail on the right.
    fn header_row(&mut self, y: f32) -> f32 {
        let (pass, config) = (self.pass, self.config);
        let page = &config.page;
        let header = &config.header;
        let band = header.height;
        let content_width = self.content_width();
        let mut right_edge = page.width - page.margin;

        if let Some(thumbnail) = self.embed(ImageRole::Thumbnail) {
            let (w, h) = fit_logo(thumbnail.pixels(), band, content_width / 3.0);
            right_edge -= w;
            self.backend
                .draw_image(thumbnail, Rect::from_top(right_edge, y, w, h), None);
            right_edge -= LOGO_TEXT_GAP;
        }

        let mut text_x = page.margin;
        let logo = self.embed(ImageRole::Logo);
        if let Some(logo) = logo {
            let (w, h) = fit_logo(logo.pixels(), band, content_width / 2.0);
            let top = y - (band - h) / 2.0;
            self.backend
                .draw_image(logo, Rect::from_top(page.margin, top, w, h), None);
            text_x += w + LOGO_TEXT_GAP;
        }

        let text = match (&logo, &pass.logo_text) {
            (_, Some(logo_text)) => Some(logo_text.as_str()),
            (Some(_), None) => None,
            (None, None) => Some(pass.organization_name.as_str()).filter(|s| !s.is_empty()),
        };
        if let Some(text) = text {
            let size = header.logo_text_size;
            let fitted = text::truncate_to_width(text, Font::Bold, size, right_edge - text_x);
            // Baseline roughly centers the cap height in the band.
            let baseline = y - band / 2.0 - size * 0.35;
            self.backend.draw_text(
                fitted,
                text_x,
                baseline,
                Font::Bold,
                size,
                self.palette.foreground,
            );
        }

        y - band - header.gap
    }

    fn header_fields(&mut self, y: f32) -> f32 {
        let (pass, sections) = (self.pass, &self.config.sections);
        self.grid(y, &pass.fields.header, 3, sections.label_size, sections.value_size)
    }

    /// Full-width strip image; tall strips are clipped to `strip_max_height`.
    fn strip(&mut self, y: f32) -> f32 {
        let Some(strip) = self.embed(ImageRole::Strip) else {
            return y;
        };
        let margin = self.config.page.margin;
        let placement = strip_placement(
            strip.pixels(),
            self.content_width(),
            self.config.sections.strip_max_height,
        );
        let rect = Rect::from_top(margin, y, placement.width, placement.height);
        let clip = placement
            .is_clipped()
            .then(|| Rect::from_top(margin, y, placement.width, placement.visible_height));
        self.backend.draw_image(strip, rect, clip);
        y - placement.visible_height - self.config.sections.separator_gap
    }

    /// Pass description, wrapped.
    fn title(&mut self, y: f32) -> f32 {
        let size = self.config.sections.title_size;
        let lines = text::wrap(&self.pass.description, Font::Bold, size, self.content_width());
        let mut y = y;
        for line in lines {
            self.backend.draw_text(
                &line,
                self.config.page.margin,
                y - size,
                Font::Bold,
                size,
                self.palette.foreground,
            );
            y -= line_height(size);
        }
        y
    }

    fn style_label(&mut self, y: f32) -> f32 {
        let size = self.config.sections.style_label_size;
        self.backend.draw_text(
            self.pass.style.display_label(),
            self.config.page.margin,
            y - size,
            Font::Regular,
            size,
            self.palette.label,
        );
        y - line_height(size)
    }

    fn separator(&mut self, y: f32) -> f32 {
        let page = &self.config.page;
        let gap = self.config.sections.separator_gap;
        let y = y - gap;
        self.backend.stroke_line(
            (page.margin, y),
            (page.width - page.margin, y),
            0.5,
            self.palette.label,
        );
        y - gap
    }

    fn primary_fields(&mut self, y: f32) -> f32 {
        let (pass, sections) = (self.pass, &self.config.sections);
        self.grid(
            y,
            &pass.fields.primary,
            2,
            sections.primary_label_size,
            sections.primary_value_size,
        )
    }

    fn secondary_fields(&mut self, y: f32) -> f32 {
        let (pass, sections) = (self.pass, &self.config.sections);
        self.grid(y, &pass.fields.secondary, 3, sections.label_size, sections.value_size)
    }

    fn auxiliary_fields(&mut self, y: f32) -> f32 {
        let (pass, sections) = (self.pass, &self.config.sections);
        if pass.fields.auxiliary.is_empty() {
            return y;
        }
        let y = self.separator(y);
        self.grid(y, &pass.fields.auxiliary, 3, sections.label_size, sections.value_size)
    }

    /// Labeled grid; field `i` lands in column `i % columns`.
    fn grid(
        &mut self,
        y: f32,
        fields: &[Field],
        columns: usize,
        label_size: f32,
        value_size: f32,
    ) -> f32 {
        let config = self.config;
        let sections = &config.sections;
        let margin = config.page.margin;
        let content_width = self.content_width();
        let cell_width = column_width(content_width, columns);
        let advance =
            grid_row_advance(label_size, sections.label_gap, value_size, sections.row_padding);

        let mut row_top = y;
        for (index, field) in fields.iter().enumerate() {
            let cell_x = column_x(margin, content_width, columns, index);

            if let Some(label) = &field.label {
                let label = text::truncate_to_width(label, Font::Regular, label_size, cell_width);
                let width = self.backend.text_width(label, Font::Regular, label_size);
                let x = align_in_cell(cell_x, cell_width, width, field.text_alignment);
                self.backend.draw_text(
                    label,
                    x,
                    row_top - label_size,
                    Font::Regular,
                    label_size,
                    self.palette.label,
                );
            }

            let formatted = format_field_value(field);
            let value = text::truncate_to_width(&formatted, Font::Bold, value_size, cell_width);
            if value.len() < formatted.len() {
                log::debug!("field '{}' truncated to {value:?}", field.key);
            }
            let width = self.backend.text_width(value, Font::Bold, value_size);
            let x = align_in_cell(cell_x, cell_width, width, field.text_alignment);
            self.backend.draw_text(
                value,
                x,
                row_top - label_size - sections.label_gap - value_size,
                Font::Bold,
                value_size,
                self.palette.foreground,
            );

            let row_complete = (index + 1) % columns == 0;
            if row_complete || index + 1 == fields.len() {
                row_top -= advance;
            }
        }
        row_top
    }

    /// Optional footer image, barcode square, format name, alt text.
    fn barcode_block(&mut self, y: f32) -> f32 {
        let (pass, config) = (self.pass, self.config);
        let Some(barcode) = &pass.barcode else {
            return y;
        };
        let page_width = config.page.width;
        let settings = &config.barcode;
        let mut y = y - settings.gap;

        if let Some(footer) = self.embed(ImageRole::Footer) {
            let (w, h) = fit_logo(
                footer.pixels(),
                settings.footer_image_height,
                self.content_width(),
            );
            let rect = Rect::from_top(centered_x(page_width, w), y, w, h);
            self.backend.draw_image(footer, rect, None);
            y -= h + CAPTION_GAP;
        }

        match encode_matrix_barcode(&barcode.message) {
            Ok(bitmap) => {
                let handle = self.backend.embed_bitmap(&bitmap);
                let size = settings.size;
                self.backend.draw_image(
                    handle,
                    Rect::from_top(centered_x(page_width, size), y, size, size),
                    None,
                );
                y -= size;
                self.summary.barcode_rendered = true;
            }
            Err(e) => log::warn!("barcode not drawn: {e}"),
        }

        y -= CAPTION_GAP;
        y = self.centered_line(
            y,
            barcode.format.display_name(),
            settings.caption_size,
            self.palette.label,
        );
        if let Some(alt_text) = &barcode.alt_text {
            y = self.centered_line(y, alt_text, settings.alt_text_size, self.palette.foreground);
        }
        y - settings.gap
    }

    fn centered_line(&mut self, y: f32, text: &str, size: f32, color: Rgb) -> f32 {
        let text = text::truncate_to_width(text, Font::Regular, size, self.content_width());
        let width = self.backend.text_width(text, Font::Regular, size);
        self.backend.draw_text(
            text,
            centered_x(self.config.page.width, width),
            y - size,
            Font::Regular,
            size,
            color,
        );
        y - line_height(size)
    }

    /// Back fields: in place when they fit above the page-break threshold,
    /// otherwise on a second page.
    fn back_fields(&mut self, y: f32) -> f32 {
        let (pass, config) = (self.pass, self.config);
        let fields = &pass.fields.back;
        if fields.is_empty() {
            return y;
        }
        let back = &config.back;
        let inline = BackStyle {
            heading_size: back.inline_heading_size,
            label_size: back.inline_label_size,
            value_size: back.inline_value_size,
            max_lines: Some(back.max_inline_lines),
            floor: back.bottom_threshold,
        };

        let projected = y - self.back_section_height(fields, &inline);
        if projected >= back.page_break_threshold {
            self.summary.back_placement = BackPlacement::Inline;
            return self.draw_back_section(y, fields, &inline);
        }

        log::debug!("back fields would end at y={projected:.1}, moving them to a new page");
        self.footer();
        let y = self.start_page();
        let on_page = BackStyle {
            heading_size: back.page_heading_size,
            label_size: back.page_label_size,
            value_size: back.page_value_size,
            max_lines: None,
            floor: back.page_bottom_threshold,
        };
        self.summary.back_placement = BackPlacement::NewPage;
        self.draw_back_section(y, fields, &on_page)
    }

    fn back_value_lines(&self, field: &Field, style: &BackStyle) -> Vec<String> {
        let value = format_field_value(field);
        let mut lines = text::wrap(&value, Font::Regular, style.value_size, self.content_width());
        if let Some(max) = style.max_lines {
            lines.truncate(max);
        }
        lines
    }

    fn back_heading_height(&self, style: &BackStyle) -> f32 {
        line_height(style.heading_size) + self.config.back.field_gap
    }

    fn back_field_height(&self, field: &Field, style: &BackStyle) -> f32 {
        let label = if field.label.is_some() {
            line_height(style.label_size)
        } else {
            0.0
        };
        let lines = self.back_value_lines(field, style).len() as f32;
        label + lines * line_height(style.value_size) + self.config.back.field_gap
    }

    fn back_section_height(&self, fields: &[Field], style: &BackStyle) -> f32 {
        self.back_heading_height(style)
            + fields
                .iter()
                .map(|field| self.back_field_height(field, style))
                .sum::<f32>()
    }

    fn draw_back_section(&mut self, y: f32, fields: &[Field], style: &BackStyle) -> f32 {
        let margin = self.config.page.margin;
        self.backend.draw_text(
            BACK_HEADING,
            margin,
            y - style.heading_size,
            Font::Bold,
            style.heading_size,
            self.palette.foreground,
        );
        let mut y = y - self.back_heading_height(style);

        for (index, field) in fields.iter().enumerate() {
            if y - self.back_field_height(field, style) < style.floor {
                let omitted = fields.len() - index;
                log::warn!("{omitted} back field(s) do not fit and were omitted");
                self.summary.back_fields_omitted = omitted;
                break;
            }
            if let Some(label) = &field.label {
                self.backend.draw_text(
                    label,
                    margin,
                    y - style.label_size,
                    Font::Regular,
                    style.label_size,
                    self.palette.label,
                );
                y -= line_height(style.label_size);
            }
            for line in self.back_value_lines(field, style) {
                self.backend.draw_text(
                    &line,
                    margin,
                    y - style.value_size,
                    Font::Regular,
                    style.value_size,
                    self.palette.foreground,
                );
                y -= line_height(style.value_size);
            }
            y -= self.config.back.field_gap;
            self.summary.back_fields_rendered += 1;
        }
        y
    }
}
