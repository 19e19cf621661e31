//! Typed configuration, loaded from TOML with environment overrides.
//!
//! The two detector base URLs and the rasterization DPI are the only
//! required settings, kept as one configuration constant per endpoint rather
//! than scattered magic strings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The single DPI shared by the rasterizer and the word extractors. Changing
/// this in one place keeps image-pixel coordinates consistent across the
/// pipeline.
pub const DEFAULT_DPI: u32 = 72;

/// Containment thresholds Θ: 0.5 for PDF-native text, 0.4 for noisier
/// OCR-sourced words.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thresholds {
    pub native: f32,
    pub ocr: f32,
}

impl Thresholds {
    pub fn for_mode(&self, mode: crate::types::TextMode) -> f32 {
        match mode {
            crate::types::TextMode::Native => self.native,
            crate::types::TextMode::Ocr => self.ocr,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub region_predictor_url: String,
    pub table_predictor_url: String,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            region_predictor_url: "http://localhost:10001".to_string(),
            table_predictor_url: "http://localhost:10002".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PipelineConfig {
    pub dpi: Option<u32>,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub detectors: DetectorConfig,
}

impl PipelineConfig {
    pub fn dpi(&self) -> u32 {
        self.dpi.unwrap_or(DEFAULT_DPI)
    }

    /// Load from a TOML file, falling back to defaults for any field the
    /// file omits. Environment variables `DOC_PREDICTOR_URL` and
    /// `TABLE_DETECTOR_URL` override the corresponding file values.
    pub fn load(path: Option<&std::path::Path>) -> crate::error::Result<Self> {
        let mut config = match path {
            Some(p) if p.exists() => {
                let text = std::fs::read_to_string(p)?;
                toml::from_str(&text).map_err(|e| crate::error::PipelineError::structural(format!("invalid config: {e}")))?
            }
            _ => PipelineConfig::default(),
        };

        if let Ok(url) = std::env::var("DOC_PREDICTOR_URL") {
            config.detectors.region_predictor_url = url;
        }
        if let Ok(url) = std::env::var("TABLE_DETECTOR_URL") {
            config.detectors.table_predictor_url = url;
        }

        Ok(config)
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { native: 0.5, ocr: 0.4 }
    }
}


mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}
