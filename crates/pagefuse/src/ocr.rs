//! OCR text extraction fallback, used when a page has no extractable PDF
//! text layer.

use crate::error::Result;
use crate::geometry::Rect;
use crate::types::Word;

/// Produces words from a rasterized page image when the PDF has no
/// embedded text layer (scanned pages).
#[async_trait::async_trait]
pub trait OcrProvider: Send + Sync {
    async fn recognize(&self, page_image: &[u8], width: u32, height: u32) -> Result<Vec<Word>>;
}

/// Rescale a word box reported in `[0, 1]`-normalized coordinates (common
/// for OCR engines) into page pixel space.
pub fn rescale_to_pixels(rect: Rect, width: u32, height: u32) -> Rect {
    Rect::new(rect.x0 * width as f32, rect.y0 * height as f32, rect.x1 * width as f32, rect.y1 * height as f32)
}
