//! Render configuration.
//!
//! Every layout constant lives here: canvas size, type sizes, section
//! spacing, the back-field page-break thresholds, and the fallback colors.
//! The defaults are tuned for the default canvas; a `passprint.toml` passed
//! with `--config` can override any subset of them.
//!
//! ## Configuration Options
//!
//! ```toml
//! [page]
//! width = 400.0              # points (1/72 inch)
//! height = 720.0
//! margin = 20.0
//!
//! [back]
//! page_break_threshold = 140.0
//! bottom_threshold = 50.0
//! page_bottom_threshold = 20.0
//! max_inline_lines = 3
//!
//! [colors]
//! background = "rgb(255, 255, 255)"
//! foreground = "rgb(0, 0, 0)"
//! label = "rgb(102, 102, 102)"
//! ```
//!
//! Run `passprint gen-config` for the full documented file. Config files are
//! sparse: unspecified keys keep their defaults. Unknown keys are rejected to
//! catch typos early.

use crate::color::{Rgb, parse_color};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Layout configuration for the render stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Canvas size and margin.
    pub page: PageConfig,
    /// Logo / thumbnail header row.
    pub header: HeaderConfig,
    /// Title, style label, strip image, and field grids.
    pub sections: SectionsConfig,
    /// Barcode block.
    pub barcode: BarcodeConfig,
    /// Back fields ("Additional Information").
    pub back: BackConfig,
    /// First-page footer (serial number, relevant date).
    pub footer: FooterConfig,
    /// Fallback colors when the pass omits or garbles its own.
    pub colors: ColorDefaults,
}

impl RenderConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let page = &self.page;
        if page.width <= 0.0 || page.height <= 0.0 {
            return Err(ConfigError::Validation(
                "page.width and page.height must be positive".into(),
            ));
        }
        if page.margin < 0.0 || page.margin * 2.0 >= page.width.min(page.height) {
            return Err(ConfigError::Validation(
                "page.margin must leave room for content".into(),
            ));
        }
        if self.back.max_inline_lines == 0 {
            return Err(ConfigError::Validation(
                "back.max_inline_lines must be at least 1".into(),
            ));
        }
        if self.back.bottom_threshold < 0.0 || self.back.bottom_threshold >= page.height {
            return Err(ConfigError::Validation(
                "back.bottom_threshold must be inside the page".into(),
            ));
        }
        let page_floor = self.back.page_bottom_threshold;
        if page_floor < 0.0 || page_floor >= page.height {
            return Err(ConfigError::Validation(
                "back.page_bottom_threshold must be inside the page".into(),
            ));
        }
        if self.back.page_break_threshold < self.back.bottom_threshold {
            return Err(ConfigError::Validation(
                "back.page_break_threshold must not be below back.bottom_threshold".into(),
            ));
        }
        let sizes = [
            ("header.height", self.header.height),
            ("header.logo_text_size", self.header.logo_text_size),
            ("sections.title_size", self.sections.title_size),
            ("sections.label_size", self.sections.label_size),
            ("sections.value_size", self.sections.value_size),
            ("sections.primary_label_size", self.sections.primary_label_size),
            ("sections.primary_value_size", self.sections.primary_value_size),
            ("sections.strip_max_height", self.sections.strip_max_height),
            ("barcode.size", self.barcode.size),
            ("back.inline_value_size", self.back.inline_value_size),
            ("back.page_value_size", self.back.page_value_size),
            ("footer.size", self.footer.size),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| *v <= 0.0) {
            return Err(ConfigError::Validation(format!("{name} must be positive")));
        }
        for (name, value) in [
            ("colors.background", &self.colors.background),
            ("colors.foreground", &self.colors.foreground),
            ("colors.label", &self.colors.label),
        ] {
            if parse_color(value).is_none() {
                return Err(ConfigError::Validation(format!(
                    "{name} = {value:?} is not a color (use rgb(r, g, b) or #rrggbb)"
                )));
            }
        }
        Ok(())
    }

    /// `width - 2 * margin`.
    pub fn content_width(&self) -> f32 {
        self.page.width - 2.0 * self.page.margin
    }
}

/// Canvas size in points; origin is bottom-left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    pub width: f32,
    pub height: f32,
    /// Uniform margin on all four sides.
    pub margin: f32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 720.0,
            margin: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeaderConfig {
    /// Height logo and thumbnail bitmaps are scaled to.
    pub height: f32,
    /// Space between the header row and the next section.
    pub gap: f32,
    pub logo_text_size: f32,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            height: 40.0,
            gap: 12.0,
            logo_text_size: 16.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SectionsConfig {
    /// Strip images taller than this at full content width are clipped.
    pub strip_max_height: f32,
    pub title_size: f32,
    pub style_label_size: f32,
    /// Label and value sizes for header, secondary and auxiliary grids.
    pub label_size: f32,
    pub value_size: f32,
    /// Label and value sizes for the primary grid.
    pub primary_label_size: f32,
    pub primary_value_size: f32,
    /// Gap between a label and its value.
    pub label_gap: f32,
    /// Extra space added below every grid row.
    pub row_padding: f32,
    /// Space above and below a separator line.
    pub separator_gap: f32,
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            strip_max_height: 110.0,
            title_size: 18.0,
            style_label_size: 10.0,
            label_size: 8.0,
            value_size: 12.0,
            primary_label_size: 9.0,
            primary_value_size: 20.0,
            label_gap: 3.0,
            row_padding: 10.0,
            separator_gap: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BarcodeConfig {
    /// Edge length of the drawn barcode square.
    pub size: f32,
    /// Height the footer image is scaled to above the barcode.
    pub footer_image_height: f32,
    pub caption_size: f32,
    pub alt_text_size: f32,
    /// Space above and below the block.
    pub gap: f32,
}

impl Default for BarcodeConfig {
    fn default() -> Self {
        Self {
            size: 140.0,
            footer_image_height: 24.0,
            caption_size: 8.0,
            alt_text_size: 10.0,
            gap: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackConfig {
    /// Back fields move to a second page when in-place rendering would end
    /// below this height.
    pub page_break_threshold: f32,
    /// On the first page, back fields stop at this height (keeps the footer clear).
    pub bottom_threshold: f32,
    /// On the second page, back fields stop at this height.
    pub page_bottom_threshold: f32,
    /// Wrapped lines kept per value when rendering in place.
    pub max_inline_lines: usize,
    pub inline_heading_size: f32,
    pub inline_label_size: f32,
    pub inline_value_size: f32,
    pub page_heading_size: f32,
    pub page_label_size: f32,
    pub page_value_size: f32,
    /// Space after each back field.
    pub field_gap: f32,
}

impl Default for BackConfig {
    fn default() -> Self {
        Self {
            page_break_threshold: 140.0,
            bottom_threshold: 50.0,
            page_bottom_threshold: 20.0,
            max_inline_lines: 3,
            inline_heading_size: 10.0,
            inline_label_size: 7.0,
            inline_value_size: 8.0,
            page_heading_size: 16.0,
            page_label_size: 9.0,
            page_value_size: 11.0,
            field_gap: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FooterConfig {
    /// Baseline height above the page bottom.
    pub offset: f32,
    pub size: f32,
}

impl Default for FooterConfig {
    fn default() -> Self {
        Self {
            offset: 16.0,
            size: 7.0,
        }
    }
}

/// Per-role fallback colors, in the same grammar as `pass.json` colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorDefaults {
    pub background: String,
    pub foreground: String,
    pub label: String,
}

impl ColorDefaults {
    pub fn background_rgb(&self) -> Rgb {
        parse_color(&self.background).unwrap_or(Rgb::WHITE)
    }

    pub fn foreground_rgb(&self) -> Rgb {
        parse_color(&self.foreground).unwrap_or(Rgb::BLACK)
    }

    pub fn label_rgb(&self) -> Rgb {
        parse_color(&self.label).unwrap_or(Rgb::new(102, 102, 102))
    }
}

impl Default for ColorDefaults {
    fn default() -> Self {
        Self {
            background: "rgb(255, 255, 255)".to_string(),
            foreground: "rgb(0, 0, 0)".to_string(),
            label: "rgb(102, 102, 102)".to_string(),
        }
    }
}

// =============================================================================
// Config loading and validation
// =============================================================================

/// Load a config file, filling unspecified keys with defaults.
///
/// Rejects unknown keys and validates the result.
pub fn load_config(path: &Path) -> Result<RenderConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: RenderConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load `path` if given, otherwise the stock defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<RenderConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(RenderConfig::default()),
    }
}

/// Returns a fully-commented stock `passprint.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# passprint Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Lengths are PDF points (1/72 inch).
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Canvas
# ---------------------------------------------------------------------------
[page]
width = 400.0
height = 720.0
# Uniform margin on all four sides.
margin = 20.0

# ---------------------------------------------------------------------------
# Header row (logo, logo text, thumbnail)
# ---------------------------------------------------------------------------
[header]
# Logo and thumbnail bitmaps are scaled to this height.
height = 40.0
gap = 12.0
logo_text_size = 16.0

# ---------------------------------------------------------------------------
# Title, strip image and field grids
# ---------------------------------------------------------------------------
[sections]
# Strip images taller than this at full width are clipped, not shrunk.
strip_max_height = 110.0
title_size = 18.0
style_label_size = 10.0
# Header, secondary and auxiliary fields.
label_size = 8.0
value_size = 12.0
# Primary fields.
primary_label_size = 9.0
primary_value_size = 20.0
label_gap = 3.0
row_padding = 10.0
separator_gap = 8.0

# ---------------------------------------------------------------------------
# Barcode block
# ---------------------------------------------------------------------------
[barcode]
size = 140.0
footer_image_height = 24.0
caption_size = 8.0
alt_text_size = 10.0
gap = 10.0

# ---------------------------------------------------------------------------
# Back fields ("Additional Information")
# ---------------------------------------------------------------------------
[back]
# Move back fields to a second page when rendering them in place would
# end below this height.
page_break_threshold = 140.0
# Back fields on the first page stop here (keeps the footer clear).
bottom_threshold = 50.0
# Back fields on the second page stop here.
page_bottom_threshold = 20.0
# Wrapped lines kept per value when rendering in place.
max_inline_lines = 3
inline_heading_size = 10.0
inline_label_size = 7.0
inline_value_size = 8.0
page_heading_size = 16.0
page_label_size = 9.0
page_value_size = 11.0
field_gap = 6.0

# ---------------------------------------------------------------------------
# First-page footer (serial number, relevant date)
# ---------------------------------------------------------------------------
[footer]
offset = 16.0
size = 7.0

# ---------------------------------------------------------------------------
# Fallback colors, used when the pass omits a color or it does not parse.
# Accepts rgb(r, g, b), #rrggbb or #rgb.
# ---------------------------------------------------------------------------
[colors]
background = "rgb(255, 255, 255)"
foreground = "rgb(0, 0, 0)"
label = "rgb(102, 102, 102)"
"##
}
