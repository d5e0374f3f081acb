// src/image_io.rs - Image decoding and source-file metadata capture

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};

use crate::errors::{FieldVisionError, Result};

const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Metadata about the file a decoded image came from, attached to reports.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceFileInfo {
    pub filename: String,
    pub byte_size: u64,
    pub media_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_ms: Option<u64>,
}

/// A decoded input image with its source metadata
pub struct InputImage {
    pub image: RgbImage,
    pub path: PathBuf,
    pub filename: String,
    pub source: SourceFileInfo,
}

/// Milliseconds since the Unix epoch for a SystemTime
pub fn epoch_ms(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_millis() as u64)
}

fn media_type(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::WebP => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Decode a raw byte payload into an RGB pixel buffer. A payload that is
/// not recognizable as an image fails with InvalidInput; a recognized but
/// undecodable payload surfaces the decode error.
pub fn decode_payload(bytes: &[u8]) -> Result<(RgbImage, ImageFormat)> {
    let format = image::guess_format(bytes)
        .map_err(|_| FieldVisionError::InvalidInput("payload is not an image".to_string()))?;
    let img = image::load_from_memory_with_format(bytes, format)?;
    Ok((img.to_rgb8(), format))
}

/// Load an image file, decode it to RGB and capture its file metadata
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<InputImage> {
    let path = path.as_ref();

    let filename = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| FieldVisionError::InvalidPath(path.to_path_buf()))?
        .to_string();

    let bytes = fs::read(path)?;
    let meta = fs::metadata(path)?;
    let (image, format) = decode_payload(&bytes)?;

    let source = SourceFileInfo {
        filename: path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(&filename)
            .to_string(),
        byte_size: meta.len(),
        media_type: media_type(format).to_string(),
        modified_ms: meta.modified().ok().and_then(epoch_ms),
    };

    Ok(InputImage {
        image,
        path: path.to_path_buf(),
        filename,
        source,
    })
}

/// Get all supported image files from a directory (recursively)
pub fn get_image_files_in_dir<P: AsRef<Path>>(dir_path: P) -> Result<Vec<PathBuf>> {
    let dir_path = dir_path.as_ref();

    if !dir_path.exists() {
        return Err(FieldVisionError::InvalidPath(dir_path.to_path_buf()));
    }

    if !dir_path.is_dir() {
        return Err(FieldVisionError::Config(format!(
            "{} is not a directory",
            dir_path.display()
        )));
    }

    let mut files = Vec::new();
    find_image_files_recursive(dir_path, &mut files)?;
    files.sort();

    Ok(files)
}

fn find_image_files_recursive(dir_path: &Path, result: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();

        if path.is_dir() {
            find_image_files_recursive(&path, result)?;
        } else if path.is_file() {
            if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                if SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
                    result.push(path);
                }
            }
        }
    }

    Ok(())
}
