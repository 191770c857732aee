//! Multi-page PDF document assembled from recorded drawing operations.

use super::backend::{BOLD_FONT, PdfBackend, REGULAR_FONT};
use crate::error::{Result, ResultExt};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Drawing area covering one whole page.
pub type PageArea<'a> = DrawingArea<PdfBackend<'a>, Shift>;

/// Page dimensions in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
}

impl PageSize {
    /// ISO A4, portrait.
    pub const A4_PORTRAIT: PageSize = PageSize {
        width: 595,
        height: 842,
    };

    /// ISO A4, landscape.
    pub const A4_LANDSCAPE: PageSize = PageSize {
        width: 842,
        height: 595,
    };

    /// 11 x 9 inches.
    pub const WIDE: PageSize = PageSize {
        width: 792,
        height: 648,
    };

    fn dimensions(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

struct RecordedPage {
    size: PageSize,
    operations: Vec<Operation>,
}

/// A PDF report being written to disk.
///
/// The output file is opened by [`ReportDocument::create`]; pages are kept
/// in memory until [`ReportDocument::finish`] serializes the document.
pub struct ReportDocument {
    path: PathBuf,
    writer: BufWriter<File>,
    pages: Vec<RecordedPage>,
}

impl ReportDocument {
    /// Open `path` for writing, truncating any existing file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).context(format!("Creating {}", path.display()))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            pages: Vec::new(),
        })
    }

    /// Path of the file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append a page of `size`, drawn by `draw` on a white background.
    pub fn add_page<F>(&mut self, size: PageSize, draw: F) -> Result<()>
    where
        F: FnOnce(&PageArea<'_>) -> Result<()>,
    {
        let mut operations = Vec::new();
        {
            let root = PdfBackend::new(&mut operations, size.dimensions()).into_drawing_area();
            root.fill(&WHITE)?;
            draw(&root)?;
            root.present()?;
        }
        debug!(
            "Recorded page {} with {} operations",
            self.pages.len() + 1,
            operations.len()
        );
        self.pages.push(RecordedPage { size, operations });
        Ok(())
    }

    /// Serialize every page, flush the file and return its path.
    pub fn finish(mut self) -> Result<PathBuf> {
        let mut document = self.build()?;
        document.compress();
        document.save_to(&mut self.writer)?;
        self.writer
            .flush()
            .context(format!("Flushing {}", self.path.display()))?;
        Ok(self.path)
    }

    fn build(&mut self) -> Result<Document> {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();

        let regular_id = document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = document.add_object(dictionary! {
            "Font" => dictionary! {
                REGULAR_FONT => regular_id,
                BOLD_FONT => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for page in self.pages.drain(..) {
            let content = Content {
                operations: page.operations,
            };
            let content_id =
                document.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(page.size.width as i64),
                    Object::Integer(page.size.height as i64),
                ],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
            }),
        );

        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_opens_file_before_pages() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.pdf");

        let document = ReportDocument::create(&path).unwrap();

        assert!(path.exists());
        assert_eq!(document.page_count(), 0);
        assert_eq!(document.path(), path.as_path());
    }

    #[test]
    fn test_finish_writes_loadable_pdf() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.pdf");

        let mut document = ReportDocument::create(&path).unwrap();
        document
            .add_page(PageSize::A4_PORTRAIT, |area| {
                area.draw(&Rectangle::new([(10, 10), (50, 50)], BLUE.filled()))?;
                Ok(())
            })
            .unwrap();
        document.add_page(PageSize::A4_LANDSCAPE, |_| Ok(())).unwrap();
        assert_eq!(document.page_count(), 2);

        let written = document.finish().unwrap();
        assert_eq!(written, path);
        assert!(std::fs::metadata(&path).unwrap().len() > 0);

        let reloaded = Document::load(&path).unwrap();
        assert_eq!(reloaded.get_pages().len(), 2);
    }

    #[test]
    fn test_failed_page_is_not_recorded() {
        let dir = TempDir::new().unwrap();
        let mut document = ReportDocument::create(dir.path().join("out.pdf")).unwrap();

        let result = document.add_page(PageSize::A4_PORTRAIT, |_| {
            Err(crate::error::ReportError::Render("boom".into()))
        });

        assert!(result.is_err());
        assert_eq!(document.page_count(), 0);
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let result = ReportDocument::create(dir.path().join("missing").join("out.pdf"));

        assert_eq!(result.err().map(|e| e.error_code()), Some("IO_ERROR"));
    }
}
