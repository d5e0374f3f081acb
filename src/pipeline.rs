// src/pipeline.rs - Analysis orchestrator: one image in, one result out

use std::path::Path;
use std::time::SystemTime;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::aggregate::{
    scan_region, scan_region_sampled, RegionMetrics, DEFAULT_SAMPLE_STRIDE,
};
use crate::classify::ClassifierThresholds;
use crate::config::{Config, MetricsStrategy};
use crate::errors::Result;
use crate::image_io::{epoch_ms, load_image, SourceFileInfo};
use crate::recommend::{generate_recommendations, Recommendation};
use crate::status::{derive_field_status, health_index, FieldStatus};
use crate::zones::{segment_zones, ZoneMetrics};

/// Per-call options for one analysis.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub strategy: MetricsStrategy,
    /// Grid size override; when None the strategy default applies
    pub grid_size: Option<u32>,
    pub include_zones: bool,
    pub sample_stride: u32,
    pub thresholds: ClassifierThresholds,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            strategy: MetricsStrategy::Fine,
            grid_size: None,
            include_zones: true,
            sample_stride: DEFAULT_SAMPLE_STRIDE,
            thresholds: ClassifierThresholds::default(),
        }
    }
}

impl AnalyzeOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            strategy: config.strategy,
            grid_size: config.grid_size,
            include_zones: config.include_zones,
            sample_stride: config.sample_stride,
            thresholds: config.thresholds,
        }
    }

    fn effective_grid_size(&self) -> u32 {
        self.grid_size.unwrap_or(self.strategy.default_grid_size())
    }
}

/// The complete, immutable result of one field analysis.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub timestamp_ms: u64,
    pub strategy: MetricsStrategy,
    pub image_width: u32,
    pub image_height: u32,
    pub total_pixel_count: u64,
    pub overall: RegionMetrics,
    pub zones: Vec<ZoneMetrics>,
    pub best_zone: Option<ZoneMetrics>,
    pub worst_zone: Option<ZoneMetrics>,
    /// Composite health index, coarse pipeline only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_index: Option<f64>,
    pub status: FieldStatus,
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceFileInfo>,
}

/// A file-level analysis: the result plus the decoded image it was
/// computed from, for callers that want to render the source.
#[derive(Debug)]
pub struct FileAnalysis {
    pub result: AnalysisResult,
    pub image: RgbImage,
}

/// Analyze a decoded pixel buffer. The buffer is only read, never
/// mutated, and no reference to it is retained after the call returns.
pub fn analyze(image: &RgbImage, options: &AnalyzeOptions) -> Result<AnalysisResult> {
    let (width, height) = image.dimensions();

    let overall = match options.strategy {
        MetricsStrategy::Fine => scan_region(image, None, &options.thresholds)?,
        MetricsStrategy::Coarse => {
            scan_region_sampled(image, None, &options.thresholds, options.sample_stride)?
        }
    };

    let zones = if options.include_zones {
        let stride = match options.strategy {
            MetricsStrategy::Fine => None,
            MetricsStrategy::Coarse => Some(options.sample_stride),
        };
        segment_zones(
            image,
            options.effective_grid_size(),
            &options.thresholds,
            stride,
        )?
    } else {
        Vec::new()
    };

    let best_zone = zones.first().cloned();
    let worst_zone = zones.last().cloned();

    let health = match options.strategy {
        MetricsStrategy::Fine => None,
        MetricsStrategy::Coarse => Some(health_index(&overall)),
    };

    let status = derive_field_status(&overall);
    let recommendations = generate_recommendations(&overall, &zones, health);

    Ok(AnalysisResult {
        timestamp_ms: epoch_ms(SystemTime::now()).unwrap_or(0),
        strategy: options.strategy,
        image_width: width,
        image_height: height,
        total_pixel_count: width as u64 * height as u64,
        overall,
        zones,
        best_zone,
        worst_zone,
        health_index: health,
        status,
        recommendations,
        source: None,
    })
}

/// Analyze an image file: validate and decode the payload, delegate to
/// `analyze`, then attach the source-file metadata. Decoding is a single
/// blocking step; there is no retry.
pub fn analyze_file<P: AsRef<Path>>(path: P, options: &AnalyzeOptions) -> Result<FileAnalysis> {
    let input = load_image(path)?;

    let mut result = analyze(&input.image, options)?;
    result.source = Some(input.source);

    Ok(FileAnalysis {
        result,
        image: input.image,
    })
}
