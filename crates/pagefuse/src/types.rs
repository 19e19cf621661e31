//! Core data model: words, predictions, segments, cells, pages.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// A single word as reported by the PDF text extractor or the OCR provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub rect: Rect,
    pub text: String,
}

/// Layout label assigned by the region detector, or synthesized by the
/// table-detector fallback rule (zero children -> relabel to `Paragraph`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Paragraph,
    Header,
    Table,
    Illustration,
    Other,
}

impl Label {
    pub fn parse(raw: &str) -> Label {
        match raw {
            "paragraph" => Label::Paragraph,
            "header" => Label::Header,
            "table" => Label::Table,
            "illustration" => Label::Illustration,
            _ => Label::Other,
        }
    }
}

/// A scored, labeled rectangle returned by a detector.
///
/// `children` is only ever populated for `label == Table`, in which case it
/// holds raw cell boxes in *crop-local* coordinates (relative to this
/// prediction's own `rect.x0, rect.y0`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub rect: Rect,
    pub score: f32,
    pub label: Label,
    #[serde(default)]
    pub children: Vec<Prediction>,
}

impl Prediction {
    pub fn new(rect: Rect, score: f32, label: Label) -> Self {
        Self { rect, score, label, children: Vec::new() }
    }
}

/// A detected region with accumulated text, built during word assignment.
///
/// Points back to its backing prediction by index into the page's flat
/// `predictions` vector rather than holding a second owning reference
/// to keep the page's data free of reference cycles.
#[derive(Debug, Clone)]
pub struct Segment {
    pub prediction_index: usize,
    pub rect: Rect,
    pub label: Label,
    pub content: String,
    pub words: Vec<Word>,
}

/// A table sub-region with inferred span attributes, built during table
/// reconstruction and discarded once its HTML has been emitted.
#[derive(Debug, Clone)]
pub struct Cell {
    pub rect: Rect,
    pub content: String,
    pub colspan: usize,
    pub rowspan: usize,
}

/// Per-page document-intake mode, controlling which word source feeds the
/// assignment pass and which containment threshold applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMode {
    Native,
    Ocr,
}

/// Per-page lifecycle state, distinct from [`DocumentStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PageStatus {
    Prediction,
    Training,
    Validation,
}

/// Document-level lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentStatus {
    Processing,
    Done,
    Failed,
}

/// A single rasterized page: its text sources, detections, and rendered
/// HTML. Owned by a `Document` in the persistence layer; transient
/// `Segment`/`Cell` state is built and discarded per page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub document_id: i64,
    pub page_num: i64,
    pub width: u32,
    pub height: u32,
    pub pdf_text: Vec<Word>,
    pub ocr_text: Option<Vec<Word>>,
    pub predictions: Vec<Prediction>,
    pub html: String,
    pub status: PageStatus,
}

impl Page {
    /// Sort predictions ascending by `y0` (stable), the reading order used
    /// before rendering.
    pub fn sort_predictions(&mut self) {
        self.predictions.sort_by(|a, b| a.rect.y0.partial_cmp(&b.rect.y0).unwrap_or(std::cmp::Ordering::Equal));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_parse_falls_back_to_other() {
        assert_eq!(Label::parse("footnote"), Label::Other);
        assert_eq!(Label::parse("table"), Label::Table);
    }

    #[test]
    fn sort_predictions_is_stable_ascending_by_y0() {
        let mut page = Page {
            document_id: 1,
            page_num: 0,
            width: 100,
            height: 100,
            pdf_text: vec![],
            ocr_text: None,
            predictions: vec![
                Prediction::new(Rect::new(0.0, 50.0, 10.0, 60.0), 1.0, Label::Paragraph),
                Prediction::new(Rect::new(0.0, 10.0, 10.0, 20.0), 1.0, Label::Header),
            ],
            html: String::new(),
            status: PageStatus::Prediction,
        };
        page.sort_predictions();
        assert_eq!(page.predictions[0].label, Label::Header);
        assert_eq!(page.predictions[1].label, Label::Paragraph);
    }
}
