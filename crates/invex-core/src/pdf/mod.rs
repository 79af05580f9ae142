//! PDF text extraction.

mod extractor;

pub use extractor::{PdfContent, PdfExtractor, PdfPage};

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF text sources.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Text of every page, in page order.
    fn extract_pages(&self) -> Result<Vec<String>>;

    /// Text of the whole document, pages joined with a newline.
    fn extract_text(&self) -> Result<String> {
        Ok(self.extract_pages()?.join("\n"))
    }

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String> {
        let index = page.checked_sub(1).ok_or(PdfError::InvalidPage(page))? as usize;
        self.extract_pages()?
            .into_iter()
            .nth(index)
            .ok_or(PdfError::InvalidPage(page))
    }

    /// Text of the first `pages` pages, joined with a newline.
    fn leading_text(&self, pages: usize) -> Result<String> {
        let pages: Vec<String> = self.extract_pages()?.into_iter().take(pages.max(1)).collect();
        Ok(pages.join("\n"))
    }
}
