//! Region and table detection: thin HTTP clients over the external
//! layout/table predictor services, plus the policy for turning their raw
//! responses into usable predictions.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::config::DetectorConfig;
use crate::error::{PipelineError, Result};
use crate::geometry::Rect;
use crate::types::{Label, Prediction};

/// Detects layout regions (paragraphs, headers, tables, illustrations) on a
/// rasterized page image.
#[async_trait::async_trait]
pub trait RegionDetector: Send + Sync {
    async fn detect(&self, page_image: &[u8]) -> Result<Vec<Prediction>>;
}

/// Detects cell boxes within a single table crop. Cells arrive with their own
/// `score`/`label`, same as a top-level region prediction, even though the
/// table reconstruction pass only consumes their boxes.
#[async_trait::async_trait]
pub trait TableDetector: Send + Sync {
    async fn detect_cells(&self, table_crop: &[u8]) -> Result<Vec<Prediction>>;
}

/// Wire request body both detector services share: the page or crop image,
/// JPEG-encoded and base64-embedded rather than sent as a raw body.
#[derive(Serialize)]
struct ImageRequest {
    image_b64: String,
}

impl ImageRequest {
    fn new(image: &[u8]) -> Self {
        Self { image_b64: base64::engine::general_purpose::STANDARD.encode(image) }
    }
}

#[derive(Debug, Deserialize)]
struct RawPrediction {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    score: f32,
    label: String,
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    predictions: Vec<RawPrediction>,
}

fn into_predictions(response: PredictionResponse) -> Vec<Prediction> {
    response.predictions.into_iter().map(|p| Prediction::new(Rect::new(p.x0, p.y0, p.x1, p.y1), p.score, Label::parse(&p.label))).collect()
}

/// HTTP-backed region detector. Any connection/timeout/5xx failure is
/// treated as transient: the page still renders using whatever predictions
/// were already available, typically none.
pub struct HttpRegionDetector {
    client: reqwest::Client,
    url: String,
}

impl HttpRegionDetector {
    pub fn new(config: &DetectorConfig) -> Self {
        let client = reqwest::Client::builder().timeout(config.timeout).build().unwrap_or_else(|_| reqwest::Client::new());
        Self { client, url: config.region_predictor_url.clone() }
    }
}

#[async_trait::async_trait]
impl RegionDetector for HttpRegionDetector {
    async fn detect(&self, page_image: &[u8]) -> Result<Vec<Prediction>> {
        let response = self
            .client
            .post(&self.url)
            .json(&ImageRequest::new(page_image))
            .send()
            .await
            .map_err(|e| PipelineError::transient(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::transient(format!("region predictor returned {}", response.status())));
        }

        let body: PredictionResponse = response.json().await.map_err(|e| PipelineError::transient(e.to_string()))?;

        let mut predictions = into_predictions(body);
        predictions.sort_by(|a, b| a.rect.y0.partial_cmp(&b.rect.y0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(predictions)
    }
}

/// HTTP-backed table-cell detector.
pub struct HttpTableDetector {
    client: reqwest::Client,
    url: String,
}

impl HttpTableDetector {
    pub fn new(config: &DetectorConfig) -> Self {
        let client = reqwest::Client::builder().timeout(config.timeout).build().unwrap_or_else(|_| reqwest::Client::new());
        Self { client, url: config.table_predictor_url.clone() }
    }
}

#[async_trait::async_trait]
impl TableDetector for HttpTableDetector {
    async fn detect_cells(&self, table_crop: &[u8]) -> Result<Vec<Prediction>> {
        let response = self
            .client
            .post(&self.url)
            .json(&ImageRequest::new(table_crop))
            .send()
            .await
            .map_err(|e| PipelineError::transient(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::transient(format!("table predictor returned {}", response.status())));
        }

        let body: PredictionResponse = response.json().await.map_err(|e| PipelineError::transient(e.to_string()))?;
        Ok(into_predictions(body))
    }
}

/// Relabel a table prediction with no detected cells as a paragraph instead:
/// an empty table is almost always a misclassification.
pub fn relabel_empty_tables(predictions: &mut [Prediction]) {
    for p in predictions.iter_mut() {
        if p.label == Label::Table && p.children.is_empty() {
            p.label = Label::Paragraph;
        }
    }
}
