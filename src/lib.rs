// src/lib.rs - Library interface for FieldVisionR

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod errors;
pub mod image_io;
pub mod output;
pub mod pipeline;
pub mod recommend;
pub mod status;
pub mod zones;

// Re-export commonly used types and functions
pub use errors::{FieldVisionError, Result};
pub use config::{Config, MetricsStrategy};
pub use pipeline::{analyze, analyze_file, AnalysisResult, AnalyzeOptions, FileAnalysis};
pub use image_io::{decode_payload, load_image, InputImage, SourceFileInfo};

// Re-export pixel classification functions
pub use classify::{
    classify_pixel,
    green_ratio,
    is_bare_earth,
    is_disease,
    is_vegetation,
    is_water,
    paleness,
    pixel_vigor,
    yellowness,
    ClassifierThresholds,
    PixelClass,
};

// Re-export region aggregation types and functions
pub use aggregate::{
    scan_region,
    scan_region_sampled,
    Region,
    RegionBounds,
    RegionMetrics,
};

// Re-export zone segmentation
pub use zones::{build_grid, segment_zones, Zone, ZoneMetrics};

// Re-export status and trend helpers
pub use status::{
    assess_trend,
    derive_field_status,
    health_index,
    FieldStatus,
    StatusLevel,
    TrendDirection,
};

// Re-export recommendation engine
pub use recommend::{generate_recommendations, Recommendation, RecommendationKind};

// Re-export report writers
pub use output::{write_report_json, write_zones_csv};
