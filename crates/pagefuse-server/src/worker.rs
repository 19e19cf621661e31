//! Background worker pool: consumes uploaded documents from a bounded
//! channel and runs every page through the reconstruction pipeline.
//!
//! A bounded `mpsc` channel backs the queue rather than an unbounded spawn
//! per upload, so a burst of uploads applies backpressure to the HTTP layer
//! instead of growing memory without limit.

use std::sync::Arc;

use pagefuse::detect::{HttpRegionDetector, HttpTableDetector};
use pagefuse::pdf::{PdfExtractor, PdfiumExtractor};
use pagefuse::pipeline::PageProcessor;
use pagefuse::types::{DocumentStatus, Page, PageStatus};
use tokio::sync::mpsc;
use tracing::{error, info, instrument};

use crate::db;
use crate::state::AppState;

pub struct WorkItem {
    pub document_id: i64,
    pub pdf_bytes: Vec<u8>,
}

/// Spawn `count` workers, each pulling from the shared receiver in a loop.
/// `mpsc::Receiver` only supports one consumer, so the receiving half is
/// wrapped for the workers to share turn-by-turn.
pub fn spawn_workers(count: usize, rx: mpsc::Receiver<WorkItem>, state: AppState) {
    let rx = Arc::new(tokio::sync::Mutex::new(rx));
    for id in 0..count {
        let rx = rx.clone();
        let state = state.clone();
        tokio::spawn(async move {
            loop {
                let item = { rx.lock().await.recv().await };
                match item {
                    Some(item) => run_one(id, &state, item).await,
                    None => break,
                }
            }
        });
    }
}

#[instrument(skip(state, item), fields(worker = worker_id, document_id = item.document_id))]
async fn run_one(worker_id: usize, state: &AppState, item: WorkItem) {
    let document_id = item.document_id;
    match process_document(state, item).await {
        Ok(()) => {
            info!("document processed");
            if let Err(e) = set_status(state, document_id, DocumentStatus::Done).await {
                error!(error = %e, "failed to mark document done");
            }
        }
        Err(e) => {
            error!(error = %e, "document processing failed");
            if let Err(e) = set_status(state, document_id, DocumentStatus::Failed).await {
                error!(error = %e, "failed to mark document failed");
            }
        }
    }
}

async fn process_document(state: &AppState, item: WorkItem) -> pagefuse::Result<()> {
    let extractor = PdfiumExtractor::open(item.pdf_bytes)?;
    let processor = PageProcessor {
        region_detector: Arc::new(HttpRegionDetector::new(&state.config.detectors)),
        table_detector: Arc::new(HttpTableDetector::new(&state.config.detectors)),
        ocr_provider: None,
        config: (*state.config).clone(),
    };

    let dpi = state.config.dpi();
    let page_count = extractor.page_count()?;
    for page_num in 0..page_count {
        let image = extractor.render_page(page_num, dpi)?;
        let words = extractor.extract_words(page_num, dpi)?;
        let (width, height) = extractor.page_size(page_num, dpi)?;
        let page = Page {
            document_id: item.document_id,
            page_num: page_num as i64,
            width,
            height,
            pdf_text: words,
            ocr_text: None,
            predictions: Vec::new(),
            html: String::new(),
            status: PageStatus::Prediction,
        };
        let processed = processor.process(&image, page).await?;

        let conn = state.db.lock().await;
        db::upsert_page(&conn, &processed).map_err(|e| pagefuse::PipelineError::structural(e.to_string()))?;
    }
    Ok(())
}

async fn set_status(state: &AppState, document_id: i64, status: DocumentStatus) -> pagefuse::Result<()> {
    let conn = state.db.lock().await;
    db::update_document_status(&conn, document_id, status).map_err(|e| pagefuse::PipelineError::structural(e.to_string()))
}
