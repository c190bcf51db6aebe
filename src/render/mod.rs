//! Layout engine: [`ParsedPass`] → PDF.
//!
//! | Module | Role |
//! |---|---|
//! | `layout` | the cursor state machine, one step per section |
//! | `geometry` | pure placement math (scaling, clipping, grid columns) |
//! | `text` | Helvetica metrics, wrapping, WinAnsi encoding |
//! | `backend` | [`DocumentBackend`] trait |
//! | `pdf_backend` | [`PdfBackend`], the `lopdf` implementation |
//!
//! Page 1 sections, top to bottom: header row, header fields, strip image,
//! title, style label, separator, primary fields, secondary fields,
//! auxiliary fields, barcode block, back fields, footer. Back fields that
//! would run below the page-break threshold move to page 2 instead.

pub mod backend;
pub mod geometry;
mod layout;
pub mod pdf_backend;
pub mod text;

pub use backend::{BackendError, DocumentBackend, ImageHandle};
pub use layout::BACK_HEADING;
pub use pdf_backend::PdfBackend;

use crate::config::RenderConfig;
use crate::pass::ParsedPass;
use layout::Layout;
use std::fmt;
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to write document: {0}")]
    SinkWrite(#[from] std::io::Error),
    #[error("Failed to build document: {0}")]
    Document(#[from] BackendError),
}

/// Where the back fields ended up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackPlacement {
    /// The pass has no back fields.
    #[default]
    None,
    /// Under the barcode on page 1.
    Inline,
    /// On a second page.
    NewPage,
}

impl fmt::Display for BackPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BackPlacement::None => "none",
            BackPlacement::Inline => "page 1",
            BackPlacement::NewPage => "page 2",
        };
        f.write_str(text)
    }
}

/// What a render produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub pages: usize,
    pub barcode_rendered: bool,
    pub back_placement: BackPlacement,
    pub back_fields_rendered: usize,
    /// Back fields dropped because they ran past the bottom of their page.
    pub back_fields_omitted: usize,
}

/// Render `pass` as PDF and write the document to `sink`.
///
/// Nothing is written to `sink` unless the whole document serialized.
pub fn render<W: Write>(
    pass: &ParsedPass,
    config: &RenderConfig,
    mut sink: W,
) -> Result<RenderSummary, RenderError> {
    let mut backend = PdfBackend::new();
    let summary = render_with(pass, config, &mut backend);
    let bytes = backend.finish()?;
    sink.write_all(&bytes)?;
    sink.flush()?;
    log::debug!("wrote {} bytes, {} page(s)", bytes.len(), summary.pages);
    Ok(summary)
}

/// Run the layout against any backend. Layout never fails; anomalies degrade.
pub fn render_with<B: DocumentBackend>(
    pass: &ParsedPass,
    config: &RenderConfig,
    backend: &mut B,
) -> RenderSummary {
    Layout::new(pass, config, backend).run()
}
