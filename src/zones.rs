// src/zones.rs - Grid partitioning of the field image into diagnostic zones

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::aggregate::{scan_region, scan_region_sampled, Region, RegionMetrics};
use crate::classify::ClassifierThresholds;
use crate::errors::Result;

/// Default grid size for the full-resolution fine pipeline
pub const DEFAULT_FINE_GRID_SIZE: u32 = 3;

/// Default grid size for the sampled coarse pipeline
pub const DEFAULT_COARSE_GRID_SIZE: u32 = 8;

/// One cell of the diagnostic grid. Carries the grid position, the
/// generated id/label and the region scanned for it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: String,
    pub label: String,
    pub row: u32,
    pub col: u32,
    pub region: Region,
}

/// A zone together with its aggregated metrics.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ZoneMetrics {
    pub zone: Zone,
    pub metrics: RegionMetrics,
}

/// Build the N x N grid of zone regions for an image. Cell width and
/// height come from integer division; the final row and column absorb the
/// remainder so the grid tiles the image exhaustively without overlap.
/// The grid is clamped to the image dimensions so every cell spans at
/// least one pixel even for images smaller than the requested grid.
pub fn build_grid(img_width: u32, img_height: u32, grid_size: u32) -> Vec<Zone> {
    let n = grid_size
        .max(1)
        .min(img_width.max(1))
        .min(img_height.max(1));
    let cell_w = img_width / n;
    let cell_h = img_height / n;

    let mut zones = Vec::with_capacity((n * n) as usize);
    for row in 0..n {
        for col in 0..n {
            let x0 = col * cell_w;
            let y0 = row * cell_h;
            let x1 = if col == n - 1 { img_width } else { (col + 1) * cell_w };
            let y1 = if row == n - 1 { img_height } else { (row + 1) * cell_h };

            let region = Region {
                id: Some(format!("zone_{}_{}", row, col)),
                label: Some(format!("Zone {}-{}", row + 1, col + 1)),
                bounds: crate::aggregate::RegionBounds::Pixels {
                    x: x0,
                    y: y0,
                    width: x1 - x0,
                    height: y1 - y0,
                },
            };

            zones.push(Zone {
                id: format!("zone_{}_{}", row, col),
                label: format!("Zone {}-{}", row + 1, col + 1),
                row,
                col,
                region,
            });
        }
    }

    zones
}

/// Scan every grid zone and return the metrics sorted by vigor index
/// descending. The sort is stable, so equal-vigor zones keep their
/// (row, col) grid order; the first element is the best-performing zone
/// and the last the worst.
pub fn segment_zones(
    image: &RgbImage,
    grid_size: u32,
    thresholds: &ClassifierThresholds,
    sample_stride: Option<u32>,
) -> Result<Vec<ZoneMetrics>> {
    let (width, height) = image.dimensions();
    let zones = build_grid(width, height, grid_size);

    let mut results = Vec::with_capacity(zones.len());
    for zone in zones {
        let metrics = match sample_stride {
            Some(stride) => scan_region_sampled(image, Some(&zone.region), thresholds, stride)?,
            None => scan_region(image, Some(&zone.region), thresholds)?,
        };
        results.push(ZoneMetrics { zone, metrics });
    }

    // Stable: ties retain ascending (row, col) order
    results.sort_by(|a, b| {
        b.metrics
            .vigor_index
            .partial_cmp(&a.metrics.vigor_index)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(results)
}
