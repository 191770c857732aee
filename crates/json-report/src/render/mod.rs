//! PDF rendering.
//!
//! Charts are drawn with `plotters` onto [`PdfBackend`], which records PDF
//! content-stream operations. [`ReportDocument`] collects those pages and
//! writes a single PDF file with `lopdf`.

mod backend;
mod document;
pub mod pages;
pub mod palette;

pub use backend::{PdfBackend, PdfBackendError, encode_win_ansi, text_width};
pub use document::{PageArea, PageSize, ReportDocument};
