// src/aggregate.rs - Region scanning and per-region metric accumulation

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::classify::{classify_pixel, ClassifierThresholds};
use crate::errors::{FieldVisionError, Result};

/// Default sampling stride for the fast scan mode (every Kth pixel)
pub const DEFAULT_SAMPLE_STRIDE: u32 = 10;

/// Round to 3 decimal places
#[inline]
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Round to 1 decimal place
#[inline]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Rectangle bounds for a region of interest, either in absolute pixel
/// coordinates or as fractions of the image dimensions. The `unit` tag
/// keeps externally supplied bounds unambiguous: integer-valued fraction
/// rectangles must not silently become pixel rectangles.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(tag = "unit", rename_all = "lowercase")]
pub enum RegionBounds {
    Pixels { x: u32, y: u32, width: u32, height: u32 },
    Fraction { x: f64, y: f64, width: f64, height: f64 },
}

/// A region of interest within the image. The id and label are carried
/// through to reports only; they never influence the computation.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Region {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub bounds: RegionBounds,
}

impl Region {
    pub fn from_fraction(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: None,
            label: None,
            bounds: RegionBounds::Fraction { x, y, width, height },
        }
    }

    pub fn from_pixels(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            id: None,
            label: None,
            bounds: RegionBounds::Pixels { x, y, width, height },
        }
    }

    /// Resolve the bounds to a half-open pixel rectangle (x0, y0, x1, y1)
    /// clamped to the image. Fractional bounds floor both the start and the
    /// end coordinate. Fails with InvalidRegion if no pixels remain.
    pub fn resolve(&self, img_width: u32, img_height: u32) -> Result<(u32, u32, u32, u32)> {
        let (x0, y0, x1, y1) = match self.bounds {
            RegionBounds::Pixels { x, y, width, height } => (
                x.min(img_width),
                y.min(img_height),
                x.saturating_add(width).min(img_width),
                y.saturating_add(height).min(img_height),
            ),
            RegionBounds::Fraction { x, y, width, height } => {
                let fx0 = (x * img_width as f64).floor();
                let fy0 = (y * img_height as f64).floor();
                let fx1 = ((x + width) * img_width as f64).floor();
                let fy1 = ((y + height) * img_height as f64).floor();
                (
                    fx0.clamp(0.0, img_width as f64) as u32,
                    fy0.clamp(0.0, img_height as f64) as u32,
                    fx1.clamp(0.0, img_width as f64) as u32,
                    fy1.clamp(0.0, img_height as f64) as u32,
                )
            }
        };

        if x0 >= x1 || y0 >= y1 {
            return Err(FieldVisionError::InvalidRegion(format!(
                "region {:?} resolves to zero pixels in a {}x{} image",
                self.bounds, img_width, img_height
            )));
        }

        Ok((x0, y0, x1, y1))
    }
}

/// Aggregated counts, channel averages and derived indices for one region.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegionMetrics {
    pub total_pixels: u64,
    pub vegetation_pixels: u64,
    pub healthy_pixels: u64,
    pub stressed_pixels: u64,
    pub water_stressed_pixels: u64,
    pub nitrogen_deficient_pixels: u64,
    pub bare_earth_pixels: u64,
    pub water_pixels: u64,
    pub disease_pixels: u64,
    pub avg_red: f64,
    pub avg_green: f64,
    pub avg_blue: f64,
    pub vigor_index: f64,
    pub vegetation_coverage: f64,
    pub health_ratio: f64,
    pub stress_ratio: f64,
    pub water_stress_index: f64,
    pub nitrogen_level: f64,
    pub disease_pressure: f64,
}

/// Running accumulator over a pixel scan
#[derive(Debug, Default)]
struct Accumulator {
    total: u64,
    vegetation: u64,
    healthy: u64,
    stressed: u64,
    water_stressed: u64,
    nitrogen_deficient: u64,
    bare_earth: u64,
    water: u64,
    disease: u64,
    sum_red: u64,
    sum_green: u64,
    sum_blue: u64,
}

impl Accumulator {
    fn add(&mut self, r: u8, g: u8, b: u8, thresholds: &ClassifierThresholds) {
        let class = classify_pixel(r, g, b, thresholds);
        self.total += 1;
        self.sum_red += r as u64;
        self.sum_green += g as u64;
        self.sum_blue += b as u64;
        if class.vegetation {
            self.vegetation += 1;
        }
        if class.healthy {
            self.healthy += 1;
        }
        if class.stressed {
            self.stressed += 1;
        }
        if class.water_stressed {
            self.water_stressed += 1;
        }
        if class.nitrogen_deficient {
            self.nitrogen_deficient += 1;
        }
        if class.bare_earth {
            self.bare_earth += 1;
        }
        if class.water {
            self.water += 1;
        }
        if class.disease {
            self.disease += 1;
        }
    }

    fn finish(self) -> RegionMetrics {
        let total = self.total as f64;
        let vegetation = self.vegetation as f64;

        let avg_red = self.sum_red as f64 / total;
        let avg_green = self.sum_green as f64 / total;
        let avg_blue = self.sum_blue as f64 / total;

        // Guarded ratios: an empty vegetation count is a defined fallback
        // (0 for stress ratios, 1 for nitrogen), never an error.
        let (health_ratio, stress_ratio, water_stress_index, nitrogen_level) =
            if self.vegetation > 0 {
                (
                    round1(self.healthy as f64 / vegetation * 100.0),
                    round1(self.stressed as f64 / vegetation * 100.0),
                    round3(self.water_stressed as f64 / vegetation),
                    round3(1.0 - self.nitrogen_deficient as f64 / vegetation),
                )
            } else {
                (0.0, 0.0, 0.0, 1.0)
            };

        RegionMetrics {
            total_pixels: self.total,
            vegetation_pixels: self.vegetation,
            healthy_pixels: self.healthy,
            stressed_pixels: self.stressed,
            water_stressed_pixels: self.water_stressed,
            nitrogen_deficient_pixels: self.nitrogen_deficient,
            bare_earth_pixels: self.bare_earth,
            water_pixels: self.water,
            disease_pixels: self.disease,
            avg_red,
            avg_green,
            avg_blue,
            vigor_index: round3((avg_green - avg_red) / (avg_green + avg_red + 1.0)),
            vegetation_coverage: round1(vegetation / total * 100.0),
            health_ratio,
            stress_ratio,
            water_stress_index,
            nitrogen_level,
            disease_pressure: round3(self.disease as f64 / total),
        }
    }
}

/// Scan every pixel of the region (or the whole image if no region is
/// given), classifying each and computing the aggregated metrics.
pub fn scan_region(
    image: &RgbImage,
    region: Option<&Region>,
    thresholds: &ClassifierThresholds,
) -> Result<RegionMetrics> {
    scan_region_with_stride(image, region, thresholds, 1)
}

/// Fast scan mode: classify every `stride`-th pixel of the region in
/// row-major order. With stride 1 this is identical to `scan_region`.
pub fn scan_region_sampled(
    image: &RgbImage,
    region: Option<&Region>,
    thresholds: &ClassifierThresholds,
    stride: u32,
) -> Result<RegionMetrics> {
    scan_region_with_stride(image, region, thresholds, stride.max(1))
}

fn scan_region_with_stride(
    image: &RgbImage,
    region: Option<&Region>,
    thresholds: &ClassifierThresholds,
    stride: u32,
) -> Result<RegionMetrics> {
    let (width, height) = image.dimensions();

    let (x0, y0, x1, y1) = match region {
        Some(region) => region.resolve(width, height)?,
        None => {
            if width == 0 || height == 0 {
                return Err(FieldVisionError::InvalidRegion(
                    "image has zero pixels".to_string(),
                ));
            }
            (0, 0, width, height)
        }
    };

    let mut acc = Accumulator::default();
    let mut index: u64 = 0;

    for y in y0..y1 {
        for x in x0..x1 {
            if index % stride as u64 == 0 {
                let pixel = image.get_pixel(x, y);
                acc.add(pixel[0], pixel[1], pixel[2], thresholds);
            }
            index += 1;
        }
    }

    if acc.total == 0 {
        return Err(FieldVisionError::InvalidRegion(
            "region yielded no sampled pixels".to_string(),
        ));
    }

    Ok(acc.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use image::Rgb;

    fn uniform(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb(rgb))
    }

    fn thresholds() -> ClassifierThresholds {
        ClassifierThresholds::default()
    }

    #[test]
    fn uniform_green_field() {
        let image = uniform(100, 100, [0, 255, 0]);
        let metrics = scan_region(&image, None, &thresholds()).unwrap();

        assert_eq!(metrics.total_pixels, 10_000);
        assert_eq!(metrics.vegetation_pixels, 10_000);
        assert_eq!(metrics.healthy_pixels, 10_000);
        assert_eq!(metrics.stressed_pixels, 0);
        assert_approx_eq!(metrics.vegetation_coverage, 100.0, 1e-9);
        assert_approx_eq!(metrics.vigor_index, 0.996, 1e-9);
        assert_approx_eq!(metrics.health_ratio, 100.0, 1e-9);
        assert_approx_eq!(metrics.nitrogen_level, 1.0, 1e-9);
    }

    #[test]
    fn uniform_red_field() {
        let image = uniform(100, 100, [255, 0, 0]);
        let metrics = scan_region(&image, None, &thresholds()).unwrap();

        assert_eq!(metrics.vegetation_pixels, 0);
        assert_approx_eq!(metrics.vigor_index, -0.996, 1e-9);
        // Denominator guards, not errors
        assert_approx_eq!(metrics.health_ratio, 0.0, 1e-9);
        assert_approx_eq!(metrics.stress_ratio, 0.0, 1e-9);
        assert_approx_eq!(metrics.water_stress_index, 0.0, 1e-9);
        assert_approx_eq!(metrics.nitrogen_level, 1.0, 1e-9);
    }

    #[test]
    fn counts_partition_the_region() {
        let mut image = uniform(20, 20, [0, 200, 0]);
        // Mix in soil, water and diseased pixels
        for x in 0..20 {
            image.put_pixel(x, 0, Rgb([150, 110, 80]));
            image.put_pixel(x, 1, Rgb([40, 60, 160]));
            image.put_pixel(x, 2, Rgb([150, 90, 50]));
        }
        let metrics = scan_region(&image, None, &thresholds()).unwrap();

        assert_eq!(metrics.total_pixels, 400);
        assert!(metrics.vegetation_pixels <= metrics.total_pixels);
        assert_eq!(
            metrics.healthy_pixels + metrics.stressed_pixels,
            metrics.vegetation_pixels
        );
        assert!(metrics.bare_earth_pixels >= 20);
        assert!(metrics.water_pixels >= 20);
        assert!(metrics.disease_pixels >= 20);
    }

    #[test]
    fn fractional_region_floors_bounds() {
        let image = uniform(100, 100, [0, 255, 0]);
        let region = Region::from_fraction(0.25, 0.25, 0.5, 0.5);
        let metrics = scan_region(&image, Some(&region), &thresholds()).unwrap();
        assert_eq!(metrics.total_pixels, 2_500);
    }

    #[test]
    fn out_of_range_region_is_rejected() {
        let image = uniform(100, 100, [0, 255, 0]);
        let region = Region::from_fraction(1.5, 0.0, 0.5, 1.0);
        let err = scan_region(&image, Some(&region), &thresholds()).unwrap_err();
        assert!(matches!(err, FieldVisionError::InvalidRegion(_)));
    }

    #[test]
    fn degenerate_pixel_region_is_rejected() {
        let image = uniform(50, 50, [0, 255, 0]);
        let region = Region::from_pixels(10, 10, 0, 5);
        assert!(matches!(
            scan_region(&image, Some(&region), &thresholds()),
            Err(FieldVisionError::InvalidRegion(_))
        ));
    }

    #[test]
    fn sampled_scan_counts_every_kth_pixel() {
        let image = uniform(100, 100, [0, 255, 0]);
        let metrics =
            scan_region_sampled(&image, None, &thresholds(), DEFAULT_SAMPLE_STRIDE).unwrap();
        assert_eq!(metrics.total_pixels, 1_000);
        assert_approx_eq!(metrics.vegetation_coverage, 100.0, 1e-9);
        assert_approx_eq!(metrics.vigor_index, 0.996, 1e-9);
    }

    #[test]
    fn integer_valued_fraction_bounds_stay_fractional() {
        let json = r#"{"unit":"fraction","x":0,"y":0,"width":1,"height":1}"#;
        let bounds: RegionBounds = serde_json::from_str(json).unwrap();
        assert!(matches!(bounds, RegionBounds::Fraction { .. }));

        let region = Region {
            id: None,
            label: None,
            bounds,
        };
        assert_eq!(region.resolve(40, 30).unwrap(), (0, 0, 40, 30));
    }

    #[test]
    fn region_bounds_serialize_with_their_unit() {
        let region = Region::from_pixels(0, 0, 10, 10);
        let json = serde_json::to_string(&region).unwrap();
        assert!(json.contains(r#""unit":"pixels""#));

        let parsed: Region = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, region);
    }

    #[test]
    fn metrics_survive_a_json_round_trip() {
        // Mixed pixels so the channel averages are repeating decimals,
        // the hardest case for float serialization
        let mut image = uniform(30, 30, [90, 140, 60]);
        // avg_green becomes 125970/900 = 139.9666..., a repeating decimal
        image.put_pixel(0, 0, Rgb([150, 110, 80]));
        let metrics = scan_region(&image, None, &thresholds()).unwrap();
        let json = serde_json::to_string(&metrics).unwrap();
        let parsed: RegionMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(metrics, parsed);
        assert_eq!(metrics.avg_green.to_bits(), parsed.avg_green.to_bits());
    }
}
