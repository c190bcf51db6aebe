//! Pure layout geometry.
//!
//! All functions here are pure and testable without a backend. Coordinates
//! are PDF points with the origin at the bottom-left of the page.

use crate::pass::TextAlignment;

/// Axis-aligned rectangle; `(x, y)` is the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle whose top edge is at `top`.
    pub fn from_top(x: f32, top: f32, width: f32, height: f32) -> Self {
        Self::new(x, top - height, width, height)
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }
}

/// Scale `(width, height)` pixels to a target height, keeping aspect.
///
/// # Examples
/// ```
/// # use passprint::render::geometry::scale_to_height;
/// assert_eq!(scale_to_height((320, 100), 40.0), (128.0, 40.0));
/// ```
pub fn scale_to_height(pixels: (u32, u32), target_height: f32) -> (f32, f32) {
    let (w, h) = pixels;
    if h == 0 {
        return (0.0, target_height);
    }
    (w as f32 * target_height / h as f32, target_height)
}

/// Logo size: scaled to `height`, then shrunk uniformly if wider than `max_width`.
pub fn fit_logo(pixels: (u32, u32), height: f32, max_width: f32) -> (f32, f32) {
    let (w, h) = scale_to_height(pixels, height);
    if w > max_width && w > 0.0 {
        let factor = max_width / w;
        (max_width, h * factor)
    } else {
        (w, h)
    }
}

/// Placement of a strip image spanning the content width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripPlacement {
    /// Drawn size at full content width, aspect kept.
    pub width: f32,
    pub height: f32,
    /// Height of the visible band; less than `height` when clipped.
    pub visible_height: f32,
}

impl StripPlacement {
    pub fn is_clipped(&self) -> bool {
        self.visible_height < self.height
    }
}

/// Strip images are scaled to the content width. Anything taller than
/// `max_height` is clipped from the bottom rather than rescaled.
pub fn strip_placement(pixels: (u32, u32), content_width: f32, max_height: f32) -> StripPlacement {
    let (w, h) = pixels;
    let height = if w == 0 {
        0.0
    } else {
        content_width * h as f32 / w as f32
    };
    StripPlacement {
        width: content_width,
        height,
        visible_height: height.min(max_height),
    }
}

/// Left edge of column `index` in an evenly split grid.
pub fn column_x(margin: f32, content_width: f32, columns: usize, index: usize) -> f32 {
    margin + (index % columns) as f32 * column_width(content_width, columns)
}

pub fn column_width(content_width: f32, columns: usize) -> f32 {
    content_width / columns.max(1) as f32
}

/// Vertical space one grid row consumes.
pub fn grid_row_advance(label_size: f32, label_gap: f32, value_size: f32, padding: f32) -> f32 {
    label_size + label_gap + value_size + padding
}

/// X position for text of `text_width` inside a cell.
pub fn align_in_cell(
    cell_x: f32,
    cell_width: f32,
    text_width: f32,
    alignment: TextAlignment,
) -> f32 {
    match alignment {
        TextAlignment::Natural | TextAlignment::Left => cell_x,
        TextAlignment::Center => cell_x + (cell_width - text_width).max(0.0) / 2.0,
        TextAlignment::Right => cell_x + (cell_width - text_width).max(0.0),
    }
}

/// Left edge that centers `item_width` on the page.
pub fn centered_x(page_width: f32, item_width: f32) -> f32 {
    (page_width - item_width) / 2.0
}
