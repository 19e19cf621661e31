//! Error taxonomy for the reconstruction pipeline.
//!
//! The pipeline distinguishes transient external failures (swallowed, page
//! still renders) from structural failures (the page is aborted).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A detector/OCR HTTP call failed. Callers substitute an empty result
    /// and keep going; this variant exists mainly so the call site can log
    /// it with context before discarding it.
    #[error("transient external failure: {0}")]
    Transient(String),

    /// Malformed detector response, missing page image, or any other
    /// condition that makes a page un-renderable. Aborts that page.
    #[error("structural failure: {0}")]
    Structural(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "pdf")]
    #[error("pdf error: {0}")]
    Pdf(String),
}

impl PipelineError {
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }

    /// Whether this error should abort the containing page (transient
    /// errors never abort; everything else does).
    pub fn is_structural(&self) -> bool {
        !matches!(self, PipelineError::Transient(_))
    }
}
