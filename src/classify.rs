// src/classify.rs - Per-pixel agronomic color classification

use serde::{Deserialize, Serialize};

/// Minimum green channel value for a pixel to count as vegetation
pub const DEFAULT_VEGETATION_GREEN_MIN: u8 = 50;

/// Margin by which green must exceed red for a pixel to count as vegetation
pub const DEFAULT_VEGETATION_GREEN_MARGIN: u8 = 10;

/// Tunable classifier thresholds. Only the vegetation gate is configurable;
/// the bare-earth / water / disease signatures are fixed constants below.
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct ClassifierThresholds {
    #[serde(default = "default_green_min")]
    pub vegetation_green_min: u8,

    #[serde(default = "default_green_margin")]
    pub vegetation_green_margin: u8,
}

fn default_green_min() -> u8 {
    DEFAULT_VEGETATION_GREEN_MIN
}

fn default_green_margin() -> u8 {
    DEFAULT_VEGETATION_GREEN_MARGIN
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            vegetation_green_min: DEFAULT_VEGETATION_GREEN_MIN,
            vegetation_green_margin: DEFAULT_VEGETATION_GREEN_MARGIN,
        }
    }
}

/// Category membership and vegetation sub-flags for one RGB pixel.
/// For vegetation pixels exactly one of `healthy` / `stressed` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelClass {
    pub vegetation: bool,
    pub healthy: bool,
    pub stressed: bool,
    pub water_stressed: bool,
    pub nitrogen_deficient: bool,
    pub bare_earth: bool,
    pub water: bool,
    pub disease: bool,
}

/// Continuous vigor contribution of a single pixel: (g - r) / (g + r + 1).
/// The +1 denominator is the crate-wide division-by-zero guard and must be
/// preserved exactly for reproducible thresholds.
#[inline]
pub fn pixel_vigor(r: u8, g: u8) -> f64 {
    (g as f64 - r as f64) / (g as f64 + r as f64 + 1.0)
}

/// Fraction of total brightness carried by the green channel: g / (r+g+b+1)
#[inline]
pub fn green_ratio(r: u8, g: u8, b: u8) -> f64 {
    g as f64 / (r as f64 + g as f64 + b as f64 + 1.0)
}

/// Yellowing signature: (r+g) / (2b+1). High values mean blue has collapsed
/// relative to red+green, the visible-light correlate of canopy yellowing.
#[inline]
pub fn yellowness(r: u8, g: u8, b: u8) -> f64 {
    (r as f64 + g as f64) / (2.0 * b as f64 + 1.0)
}

/// Paleness signature: (r+b) / (2g+1). High values mean green no longer
/// dominates, a proxy for chlorophyll loss.
#[inline]
pub fn paleness(r: u8, g: u8, b: u8) -> f64 {
    (r as f64 + b as f64) / (2.0 * g as f64 + 1.0)
}

/// Check if a pixel reads as vegetation: green clearly above red,
/// above blue, and above the minimum brightness floor.
#[inline]
pub fn is_vegetation(r: u8, g: u8, b: u8, thresholds: &ClassifierThresholds) -> bool {
    g as u16 > r as u16 + thresholds.vegetation_green_margin as u16
        && g > b
        && g > thresholds.vegetation_green_min
}

/// Check if a pixel reads as bare earth: red-dominant, mid-brightness,
/// with enough red/green separation to exclude grayscale and shadow pixels.
#[inline]
pub fn is_bare_earth(r: u8, g: u8, b: u8) -> bool {
    r >= g && r >= b && (80..=200).contains(&r) && r.abs_diff(g) > 20
}

/// Check if a pixel reads as water or standing moisture: blue-dominant,
/// bright enough in blue, but dark overall.
#[inline]
pub fn is_water(r: u8, g: u8, b: u8) -> bool {
    b >= r && b >= g && b > 120 && (r as u16 + g as u16 + b as u16) < 400
}

/// Check if a pixel matches a disease/stress color signature: either
/// yellowing (red and green both high, blue low, red close to green) or
/// browning (mid red, low green, very low blue, strictly r > g > b).
#[inline]
pub fn is_disease(r: u8, g: u8, b: u8) -> bool {
    let yellowing = r > 150 && g > 150 && b < 100 && r.abs_diff(g) < 30;
    let browning = (101..180).contains(&r)
        && (61..120).contains(&g)
        && b < 80
        && r > g
        && g > b;
    yellowing || browning
}

/// Classify one pixel into all categories at once. Vegetation sub-flags
/// (healthy/stressed/water-stressed/nitrogen-deficient) are only ever set
/// for vegetation pixels; the disease flag is independent of vegetation.
pub fn classify_pixel(r: u8, g: u8, b: u8, thresholds: &ClassifierThresholds) -> PixelClass {
    let mut class = PixelClass::default();

    if is_vegetation(r, g, b, thresholds) {
        class.vegetation = true;

        let ratio = green_ratio(r, g, b);
        let vigor = pixel_vigor(r, g);

        if yellowness(r, g, b) > 1.5 && ratio < 0.4 {
            class.water_stressed = true;
        }
        if paleness(r, g, b) > 0.8 && g < 120 {
            class.nitrogen_deficient = true;
        }

        if ratio > 0.4 && vigor > 0.2 {
            class.healthy = true;
        } else {
            class.stressed = true;
        }
    }

    class.bare_earth = is_bare_earth(r, g, b);
    class.water = is_water(r, g, b);
    class.disease = is_disease(r, g, b);

    class
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn defaults() -> ClassifierThresholds {
        ClassifierThresholds::default()
    }

    #[test]
    fn pure_green_is_healthy_vegetation() {
        let class = classify_pixel(0, 255, 0, &defaults());
        assert!(class.vegetation);
        assert!(class.healthy);
        assert!(!class.stressed);
        assert!(!class.bare_earth);
        assert!(!class.water);
        assert!(!class.disease);
    }

    #[test]
    fn pure_red_is_not_vegetation() {
        let class = classify_pixel(255, 0, 0, &defaults());
        assert!(!class.vegetation);
        assert!(!class.healthy);
        assert!(!class.stressed);
    }

    #[test]
    fn vegetation_is_exactly_healthy_or_stressed() {
        // Sweep a coarse lattice of the RGB cube
        let thresholds = defaults();
        for r in (0..=255u16).step_by(17) {
            for g in (0..=255u16).step_by(17) {
                for b in (0..=255u16).step_by(17) {
                    let class = classify_pixel(r as u8, g as u8, b as u8, &thresholds);
                    if class.vegetation {
                        assert!(class.healthy ^ class.stressed);
                    } else {
                        assert!(!class.healthy && !class.stressed);
                        assert!(!class.water_stressed && !class.nitrogen_deficient);
                    }
                }
            }
        }
    }

    #[test]
    fn classification_is_deterministic() {
        let thresholds = defaults();
        let a = classify_pixel(130, 90, 40, &thresholds);
        let b = classify_pixel(130, 90, 40, &thresholds);
        assert_eq!(a, b);
    }

    #[test]
    fn vigor_matches_definition() {
        assert_approx_eq!(pixel_vigor(0, 255), 255.0 / 256.0, 1e-9);
        assert_approx_eq!(pixel_vigor(255, 0), -255.0 / 256.0, 1e-9);
        assert_approx_eq!(pixel_vigor(0, 0), 0.0, 1e-9);
    }

    #[test]
    fn soil_tones_read_as_bare_earth() {
        assert!(is_bare_earth(150, 110, 80));
        // Grayscale: red/green too close
        assert!(!is_bare_earth(150, 145, 140));
        // Too bright to be soil
        assert!(!is_bare_earth(230, 180, 120));
    }

    #[test]
    fn dark_blue_reads_as_water() {
        assert!(is_water(40, 60, 160));
        // Bright sky-blue is too bright overall
        assert!(!is_water(150, 180, 250));
        // Blue-dominant but too dim in blue
        assert!(!is_water(30, 40, 100));
    }

    #[test]
    fn disease_signatures() {
        // Yellowing: both warm channels high, blue collapsed
        assert!(is_disease(200, 190, 60));
        // Browning: r > g > b in the brown band
        assert!(is_disease(150, 90, 50));
        // Healthy green is not disease
        assert!(!is_disease(40, 180, 60));
        // Yellowing requires red close to green
        assert!(!is_disease(250, 160, 60));
    }

    #[test]
    fn water_stress_and_nitrogen_flags() {
        // Yellow-green vegetation: green wins but only just, blue collapsed
        // green_ratio = 131/332 ~ 0.395, yellowness = 251/161 ~ 1.56
        let class = classify_pixel(120, 131, 80, &defaults());
        assert!(class.vegetation);
        assert!(class.water_stressed);
        assert!(class.stressed);

        // Pale dim vegetation: paleness = 180/221 ~ 0.81, green below 120
        let class = classify_pixel(95, 110, 85, &defaults());
        assert!(class.vegetation);
        assert!(class.nitrogen_deficient);
    }
}
