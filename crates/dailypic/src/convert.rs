//! PNG format converter
//!
//! Re-encodes non-PNG images as PNG next to the original. Files that are not
//! decodable images are skipped without complaint; genuine I/O and encoding
//! failures are collected separately so they are never mistaken for skips.

use crate::error::{PicError, Result};
use image::{ImageError, ImageFormat, ImageReader};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What happened to a single candidate file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// A sibling PNG was written
    Converted(PathBuf),
    /// Extension is already `.png` (any case)
    AlreadyPng,
    /// Not a file, or content is not a decodable image
    NotAnImage,
}

/// Summary of a conversion run
#[derive(Debug, Default)]
pub struct ConversionReport {
    /// (source, written PNG)
    pub converted: Vec<(PathBuf, PathBuf)>,
    pub already_png: Vec<PathBuf>,
    pub not_images: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, PicError)>,
}

impl ConversionReport {
    /// PNG written for `source`, if any
    pub fn png_for(&self, source: &Path) -> Option<&Path> {
        self.converted
            .iter()
            .find(|(from, _)| from == source)
            .map(|(_, to)| to.as_path())
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Whether the path carries a `.png` extension (case-insensitive)
pub fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// Sibling path with the same base name and a `.png` extension
pub fn png_path(path: &Path) -> PathBuf {
    path.with_extension("png")
}

/// Convert a file, or every entry of a directory (non-recursive), to PNG
///
/// Returns `InvalidPath` without touching anything when `path` is neither a
/// file nor a directory.
pub fn convert_to_png(path: &Path) -> Result<ConversionReport> {
    let candidates = if path.is_file() {
        vec![path.to_path_buf()]
    } else if path.is_dir() {
        let mut entries: Vec<PathBuf> = fs::read_dir(path)?
            .flatten()
            .map(|entry| entry.path())
            .collect();
        entries.sort();
        entries
    } else {
        return Err(PicError::InvalidPath(path.to_path_buf()));
    };

    let mut report = ConversionReport::default();
    for candidate in candidates {
        match convert_file(&candidate) {
            Ok(FileOutcome::Converted(target)) => {
                info!(
                    "Converted {} to {}",
                    display_name(&candidate),
                    display_name(&target)
                );
                report.converted.push((candidate, target));
            }
            Ok(FileOutcome::AlreadyPng) => report.already_png.push(candidate),
            Ok(FileOutcome::NotAnImage) => {
                debug!(path = %candidate.display(), "Skipping non-image");
                report.not_images.push(candidate);
            }
            Err(e) => {
                warn!(path = %candidate.display(), error = %e, "Conversion failed");
                report.failed.push((candidate, e));
            }
        }
    }

    Ok(report)
}

/// Convert one file, leaving the original untouched
pub fn convert_file(path: &Path) -> Result<FileOutcome> {
    if is_png(path) {
        return Ok(FileOutcome::AlreadyPng);
    }
    if !path.is_file() {
        return Ok(FileOutcome::NotAnImage);
    }

    let reader = ImageReader::open(path)?.with_guessed_format()?;
    if reader.format().is_none() {
        return Ok(FileOutcome::NotAnImage);
    }

    let img = match reader.decode() {
        Ok(img) => img,
        Err(ImageError::Decoding(_) | ImageError::Unsupported(_)) => {
            return Ok(FileOutcome::NotAnImage)
        }
        Err(ImageError::IoError(e)) => return Err(PicError::Io(e)),
        Err(e) => return Err(PicError::Image(format!("Failed to decode image: {}", e))),
    };

    let target = png_path(path);
    img.save_with_format(&target, ImageFormat::Png)
        .map_err(|e| match e {
            ImageError::IoError(io) => PicError::Io(io),
            other => PicError::Image(format!("Failed to encode PNG: {}", other)),
        })?;

    Ok(FileOutcome::Converted(target))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
