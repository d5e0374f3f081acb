// src/status.rs - Field status classification, composite health index and
// threshold-trend helpers

use serde::{Deserialize, Serialize};

use crate::aggregate::{round3, RegionMetrics};

/// Overall field severity. Ordered so that `max` escalates correctly.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Good,
    Warning,
    Critical,
}

/// Overall field verdict derived from the whole-image metrics.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldStatus {
    pub level: StatusLevel,
    pub needs_attention: bool,
    pub issues: Vec<String>,
    pub summary: String,
}

/// Derive the field status from the overall metrics. The checks run in a
/// fixed order and may only escalate the severity, never downgrade it;
/// issue strings accumulate in check order.
pub fn derive_field_status(metrics: &RegionMetrics) -> FieldStatus {
    let mut level = StatusLevel::Good;
    let mut issues = Vec::new();

    if metrics.vigor_index < 0.3 {
        issues.push("Low vegetation vigor".to_string());
        level = level.max(StatusLevel::Critical);
    } else if metrics.vigor_index < 0.5 {
        issues.push("Moderate vegetation concerns".to_string());
        level = level.max(StatusLevel::Warning);
    }

    if metrics.water_stress_index > 0.3 {
        issues.push("High water stress".to_string());
        level = level.max(StatusLevel::Critical);
    } else if metrics.water_stress_index > 0.15 {
        issues.push("Water stress detected".to_string());
        level = level.max(StatusLevel::Warning);
    }

    if metrics.nitrogen_level < 0.6 {
        issues.push("Nitrogen deficiency".to_string());
        level = level.max(StatusLevel::Warning);
    }

    if metrics.vegetation_coverage < 60.0 {
        issues.push("Low coverage".to_string());
        level = level.max(StatusLevel::Warning);
    }

    let summary = if issues.is_empty() {
        "Field appears healthy".to_string()
    } else {
        issues.join(", ")
    };

    FieldStatus {
        level,
        needs_attention: level != StatusLevel::Good,
        issues,
        summary,
    }
}

/// Composite health index for the coarse pipeline:
/// (vigor + crop density + (1 - water stress) + soil health) / 4.
/// Vigor enters normalized into [0, 1]; crop density is the vegetation
/// fraction; soil health is the complement of disease pressure.
pub fn health_index(metrics: &RegionMetrics) -> f64 {
    let vigor = (metrics.vigor_index + 1.0) / 2.0;
    let crop_density = metrics.vegetation_coverage / 100.0;
    let water_stress = metrics.water_stress_index;
    let soil_health = 1.0 - metrics.disease_pressure;
    round3((vigor + crop_density + (1.0 - water_stress) + soil_health) / 4.0)
}

/// Direction a metric is moving relative to its thresholds. The direction
/// always points toward the worsening side once the value leaves the good
/// tier; at the good tier it is stable.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// Classify a single value against a {good, warning} threshold pair.
/// With `higher_is_better` the tiers are value >= good, value >= warning,
/// else critical; otherwise the comparisons flip.
pub fn assess_trend(
    value: f64,
    good: f64,
    warning: f64,
    higher_is_better: bool,
) -> (StatusLevel, TrendDirection) {
    if higher_is_better {
        if value >= good {
            (StatusLevel::Good, TrendDirection::Stable)
        } else if value >= warning {
            (StatusLevel::Warning, TrendDirection::Down)
        } else {
            (StatusLevel::Critical, TrendDirection::Down)
        }
    } else if value <= good {
        (StatusLevel::Good, TrendDirection::Stable)
    } else if value <= warning {
        (StatusLevel::Warning, TrendDirection::Up)
    } else {
        (StatusLevel::Critical, TrendDirection::Up)
    }
}
