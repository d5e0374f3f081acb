// src/recommend.rs - Rule table mapping index thresholds to prioritized,
// actionable recommendations

use serde::{Deserialize, Serialize};

use crate::aggregate::RegionMetrics;
use crate::zones::ZoneMetrics;

/// Priority ranks: lower is more urgent
pub const PRIORITY_HIGH: u8 = 1;
pub const PRIORITY_MEDIUM: u8 = 2;
pub const PRIORITY_LOW: u8 = 3;

/// Severity/type tag of a recommendation.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Critical,
    Warning,
    Info,
    Action,
    Success,
}

/// One actionable recommendation for the grower.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub category: String,
    pub kind: RecommendationKind,
    pub priority: u8,
    pub message: String,
    pub actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<String>>,
}

impl Recommendation {
    fn new(
        category: &str,
        kind: RecommendationKind,
        priority: u8,
        message: impl Into<String>,
        actions: &[&str],
    ) -> Self {
        Self {
            category: category.to_string(),
            kind,
            priority,
            message: message.into(),
            actions: actions.iter().map(|a| a.to_string()).collect(),
            zones: None,
        }
    }
}

/// Evaluate the fixed rule table against the overall metrics and the zone
/// list. Rules are independently triggerable; the returned list is stably
/// sorted by ascending priority, so equal-priority entries keep rule-table
/// order. `health_index` is Some only for the coarse pipeline, which adds
/// its success / fallback rules.
pub fn generate_recommendations(
    overall: &RegionMetrics,
    zones: &[ZoneMetrics],
    health_index: Option<f64>,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if overall.vigor_index < 0.3 {
        recommendations.push(Recommendation::new(
            "Vegetation Health",
            RecommendationKind::Critical,
            PRIORITY_HIGH,
            "Vegetation vigor is severely reduced across the field",
            &[
                "Scout the field for pest and disease damage",
                "Verify irrigation system coverage",
                "Order a soil fertility test",
            ],
        ));
    } else if overall.vigor_index < 0.5 {
        recommendations.push(Recommendation::new(
            "Vegetation Health",
            RecommendationKind::Warning,
            PRIORITY_MEDIUM,
            "Vegetation vigor is below the expected range",
            &[
                "Increase scouting frequency",
                "Review recent fertilizer and irrigation schedules",
            ],
        ));
    }

    if overall.water_stress_index > 0.3 {
        recommendations.push(Recommendation::new(
            "Water Management",
            RecommendationKind::Critical,
            PRIORITY_HIGH,
            "A large share of the canopy shows water stress",
            &[
                "Irrigate as soon as conditions allow",
                "Inspect emitters and lines for blockages",
            ],
        ));
    } else if overall.water_stress_index > 0.15 {
        recommendations.push(Recommendation::new(
            "Water Management",
            RecommendationKind::Warning,
            PRIORITY_MEDIUM,
            "Early signs of water stress detected",
            &[
                "Check soil moisture at multiple depths",
                "Plan irrigation within the next few days",
            ],
        ));
    }

    if overall.nitrogen_level < 0.6 {
        recommendations.push(Recommendation::new(
            "Nutrient Management",
            RecommendationKind::Warning,
            PRIORITY_MEDIUM,
            "Pale canopy color suggests nitrogen deficiency",
            &[
                "Confirm with a leaf tissue test",
                "Plan a split nitrogen application",
            ],
        ));
    }

    if overall.vegetation_coverage < 60.0 {
        recommendations.push(Recommendation::new(
            "Field Management",
            RecommendationKind::Info,
            PRIORITY_LOW,
            "Vegetation covers less of the field than expected",
            &[
                "Check for establishment gaps or bare patches",
                "Review the planting and emergence records",
            ],
        ));
    }

    // Zone-level rule: one recommendation naming every offending zone
    let offenders: Vec<&ZoneMetrics> = zones
        .iter()
        .filter(|z| {
            z.metrics.vigor_index < 0.4
                || z.metrics.water_stress_index > 0.2
                || z.metrics.nitrogen_level < 0.7
        })
        .collect();

    if !offenders.is_empty() {
        let labels: Vec<&str> = offenders.iter().map(|z| z.zone.label.as_str()).collect();
        let ids: Vec<String> = offenders.iter().map(|z| z.zone.id.clone()).collect();
        let mut rec = Recommendation::new(
            "Precision Management",
            RecommendationKind::Action,
            PRIORITY_MEDIUM,
            format!(
                "Zones needing targeted attention: {}",
                labels.join(", ")
            ),
            &[
                "Ground-truth the flagged zones",
                "Apply inputs variably rather than field-wide",
            ],
        );
        rec.zones = Some(ids);
        recommendations.push(rec);
    }

    // Success and empty-list fallback belong to the coarse health-index
    // pipeline only; the fine pipeline may return an empty list.
    if let Some(health) = health_index {
        if health > 0.8 {
            recommendations.push(Recommendation::new(
                "Field Health",
                RecommendationKind::Success,
                PRIORITY_LOW,
                "Composite health index is strong; current practices are working",
                &["Maintain the current management program"],
            ));
        }

        if recommendations.is_empty() {
            recommendations.push(Recommendation::new(
                "Monitoring",
                RecommendationKind::Info,
                PRIORITY_LOW,
                "No immediate issues detected; continue routine monitoring",
                &["Re-image the field at the next scheduled flight"],
            ));
        }
    }

    // Stable: equal priorities keep rule-table order
    recommendations.sort_by_key(|r| r.priority);

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Region, RegionMetrics};
    use crate::zones::{Zone, ZoneMetrics};

    fn metrics_with(
        vigor: f64,
        water_stress: f64,
        nitrogen: f64,
        coverage: f64,
    ) -> RegionMetrics {
        RegionMetrics {
            total_pixels: 1_000,
            vegetation_pixels: 800,
            healthy_pixels: 700,
            stressed_pixels: 100,
            water_stressed_pixels: 0,
            nitrogen_deficient_pixels: 0,
            bare_earth_pixels: 100,
            water_pixels: 50,
            disease_pixels: 0,
            avg_red: 80.0,
            avg_green: 150.0,
            avg_blue: 60.0,
            vigor_index: vigor,
            vegetation_coverage: coverage,
            health_ratio: 87.5,
            stress_ratio: 12.5,
            water_stress_index: water_stress,
            nitrogen_level: nitrogen,
            disease_pressure: 0.0,
        }
    }

    fn zone_with(row: u32, col: u32, vigor: f64) -> ZoneMetrics {
        let mut metrics = metrics_with(vigor, 0.0, 1.0, 90.0);
        metrics.vigor_index = vigor;
        ZoneMetrics {
            zone: Zone {
                id: format!("zone_{}_{}", row, col),
                label: format!("Zone {}-{}", row + 1, col + 1),
                row,
                col,
                region: Region::from_fraction(0.0, 0.0, 1.0, 1.0),
            },
            metrics,
        }
    }

    #[test]
    fn healthy_fine_pipeline_yields_no_recommendations() {
        let recs = generate_recommendations(&metrics_with(0.7, 0.05, 0.95, 90.0), &[], None);
        assert!(recs.is_empty());
    }

    #[test]
    fn coarse_pipeline_falls_back_to_monitoring_info() {
        // Nothing in the table fires and the health index is not strong
        // enough for a success, so the coarse pipeline adds the fallback
        let recs =
            generate_recommendations(&metrics_with(0.7, 0.05, 0.95, 90.0), &[], Some(0.7));
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::Info);
        assert_eq!(recs[0].category, "Monitoring");
    }

    #[test]
    fn rules_are_independently_triggerable() {
        let recs = generate_recommendations(&metrics_with(0.2, 0.4, 0.5, 40.0), &[], None);
        let categories: Vec<&str> = recs.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(
            categories,
            vec![
                "Vegetation Health",
                "Water Management",
                "Nutrient Management",
                "Field Management"
            ]
        );
        // Sorted by ascending priority, ties in rule-table order
        let priorities: Vec<u8> = recs.iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![1, 1, 2, 3]);
    }

    #[test]
    fn zone_rule_names_every_offending_zone() {
        let zones = vec![
            zone_with(0, 0, 0.9),
            zone_with(0, 1, 0.35),
            zone_with(1, 0, 0.2),
        ];
        let recs = generate_recommendations(&metrics_with(0.7, 0.05, 0.95, 90.0), &zones, None);
        let precision = recs
            .iter()
            .find(|r| r.category == "Precision Management")
            .unwrap();
        assert_eq!(precision.kind, RecommendationKind::Action);
        assert!(precision.message.contains("Zone 1-2"));
        assert!(precision.message.contains("Zone 2-1"));
        assert!(!precision.message.contains("Zone 1-1"));
        assert_eq!(
            precision.zones.as_ref().unwrap(),
            &vec!["zone_0_1".to_string(), "zone_1_0".to_string()]
        );
    }

    #[test]
    fn strong_health_index_earns_a_success() {
        let recs =
            generate_recommendations(&metrics_with(0.7, 0.05, 0.95, 90.0), &[], Some(0.9));
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::Success);
        assert_eq!(recs[0].category, "Field Health");
    }

    #[test]
    fn recommendation_order_is_deterministic() {
        let metrics = metrics_with(0.2, 0.4, 0.5, 40.0);
        let first = generate_recommendations(&metrics, &[], None);
        let second = generate_recommendations(&metrics, &[], None);
        assert_eq!(first, second);
    }
}
