// src/output.rs - Report serialization: JSON result files and per-zone CSV

use std::fs;
use std::path::Path;
use csv::Writer;

use crate::errors::Result;
use crate::pipeline::AnalysisResult;

/// Write the full analysis result as a JSON report to
/// `<output_dir>/reports/<filename>.json`
pub fn write_report_json<P: AsRef<Path>>(
    result: &AnalysisResult,
    output_dir: P,
    filename: &str,
) -> Result<()> {
    let output_path = output_dir
        .as_ref()
        .join("reports")
        .join(format!("{}.json", filename));

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(result)?;
    fs::write(&output_path, json)?;

    Ok(())
}

/// Write the per-zone metrics table to `<output_dir>/zones/<filename>.csv`
pub fn write_zones_csv<P: AsRef<Path>>(
    result: &AnalysisResult,
    output_dir: P,
    filename: &str,
) -> Result<()> {
    let output_path = output_dir
        .as_ref()
        .join("zones")
        .join(format!("{}.csv", filename));

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = Writer::from_path(&output_path)?;

    writer.write_record([
        "Zone_Id",
        "Label",
        "Row",
        "Col",
        "Total_Pixels",
        "Vegetation_Coverage",
        "Vigor_Index",
        "Health_Ratio",
        "Stress_Ratio",
        "Water_Stress_Index",
        "Nitrogen_Level",
        "Disease_Pressure",
    ])?;

    for zone in &result.zones {
        writer.write_record([
            zone.zone.id.clone(),
            zone.zone.label.clone(),
            zone.zone.row.to_string(),
            zone.zone.col.to_string(),
            zone.metrics.total_pixels.to_string(),
            format!("{:.1}", zone.metrics.vegetation_coverage),
            format!("{:.3}", zone.metrics.vigor_index),
            format!("{:.1}", zone.metrics.health_ratio),
            format!("{:.1}", zone.metrics.stress_ratio),
            format!("{:.3}", zone.metrics.water_stress_index),
            format!("{:.3}", zone.metrics.nitrogen_level),
            format!("{:.3}", zone.metrics.disease_pressure),
        ])?;
    }

    writer.flush().map_err(csv::Error::from)?;

    Ok(())
}
