//! Page orchestration: sequences detection, assignment, table
//! reconstruction, and rendering into a single pass over one page.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{instrument, warn};

use crate::assign::{assign_and_realign, theta_for};
use crate::config::PipelineConfig;
use crate::detect::{relabel_empty_tables, RegionDetector, TableDetector};
use crate::error::Result;
use crate::geometry::Rect;
use crate::ocr::OcrProvider;
use crate::render::render_page;
use crate::table;
use crate::types::{Label, Page, PageStatus, TextMode, Word};

/// Wires the pluggable detector/OCR backends together with the containment
/// thresholds they're evaluated against.
pub struct PageProcessor {
    pub region_detector: Arc<dyn RegionDetector>,
    pub table_detector: Arc<dyn TableDetector>,
    pub ocr_provider: Option<Arc<dyn OcrProvider>>,
    pub config: PipelineConfig,
}

impl PageProcessor {
    /// Run the full reconstruction pass for one rasterized page.
    ///
    /// On a structural failure the page is returned with empty HTML and left
    /// in [`PageStatus::Prediction`] for the caller to mark failed; transient
    /// detector failures fall back to an empty prediction set rather than
    /// aborting.
    #[instrument(skip(self, page_image, page), fields(document_id = page.document_id, page_num = page.page_num))]
    pub async fn process(&self, page_image: &[u8], mut page: Page) -> Result<Page> {
        let (words, mode) = self.resolve_words(page_image, &page).await?;

        let mut predictions = match self.region_detector.detect(page_image).await {
            Ok(p) => p,
            Err(e) if !e.is_structural() => {
                warn!(error = %e, "region detector unavailable, continuing with no predictions");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        for prediction in predictions.iter_mut().filter(|p| p.label == Label::Table) {
            match self.table_detector.detect_cells(page_image).await {
                Ok(cells) => {
                    prediction.children = cells;
                }
                Err(e) if !e.is_structural() => {
                    warn!(error = %e, "table detector unavailable, table region kept without cells");
                }
                Err(e) => return Err(e),
            }
        }
        relabel_empty_tables(&mut predictions);
        predictions.sort_by(|a, b| a.rect.y0.partial_cmp(&b.rect.y0).unwrap_or(std::cmp::Ordering::Equal));

        let theta = theta_for(mode, &self.config.thresholds);
        let segments = assign_and_realign(&words, &predictions, theta);

        let mut tables = HashMap::new();
        for segment in segments.iter().filter(|s| s.label == Label::Table) {
            let prediction = &predictions[segment.prediction_index];
            let raw_cells: Vec<Rect> = prediction.children.iter().map(|c| c.rect).collect();
            let crop_words: Vec<Word> =
                words.iter().filter(|w| w.rect.containment(&segment.rect) > 0.5).map(|w| translate_into_crop(w, segment.rect)).collect();
            let reconstructed = table::reconstruct(raw_cells, &crop_words, theta);
            tables.insert(segment.prediction_index, reconstructed);
        }

        let illustrations = HashMap::new();

        page.predictions = predictions;
        page.html = render_page(&segments, &tables, &illustrations);
        page.status = PageStatus::Prediction;
        Ok(page)
    }

    /// Native PDF text if present, otherwise OCR output.
    async fn resolve_words(&self, page_image: &[u8], page: &Page) -> Result<(Vec<Word>, TextMode)> {
        if !page.pdf_text.is_empty() {
            return Ok((page.pdf_text.clone(), TextMode::Native));
        }
        if let Some(existing) = &page.ocr_text {
            return Ok((existing.clone(), TextMode::Ocr));
        }
        if let Some(provider) = &self.ocr_provider {
            let words = provider.recognize(page_image, page.width, page.height).await?;
            return Ok((words, TextMode::Ocr));
        }
        Ok((Vec::new(), TextMode::Native))
    }
}

/// Move a word from page coordinates into a table segment's crop-local
/// coordinates, matching how the table detector's cell boxes are reported.
fn translate_into_crop(word: &Word, segment_rect: Rect) -> Word {
    Word { rect: word.rect.translated(-segment_rect.x0, -segment_rect.y0), text: word.text.clone() }
}
