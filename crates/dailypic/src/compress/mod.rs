//! Image compression
//!
//! Shrinks a local file through a remote service and writes the result back
//! over the original.

pub mod tinify;
pub mod traits;

// Re-exports
pub use tinify::TinifyClient;
pub use traits::{Compressed, CompressionService};

use crate::error::{PicError, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Size figures for one compressed file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionStats {
    pub input_size: u64,
    pub output_size: u64,
    pub compression_count: Option<u32>,
}

impl CompressionStats {
    /// Output size as a fraction of the input size
    pub fn ratio(&self) -> f64 {
        if self.input_size == 0 {
            1.0
        } else {
            self.output_size as f64 / self.input_size as f64
        }
    }
}

/// Compress `path` in place
///
/// A path that is not a regular file yields `NotFound` without contacting the
/// service. A failed call leaves the file untouched and is not retried.
pub fn compress_file<S: CompressionService + ?Sized>(
    path: &Path,
    service: &S,
) -> Result<CompressionStats> {
    if !path.is_file() {
        return Err(PicError::NotFound(path.to_path_buf()));
    }

    let input = fs::read(path)?;
    debug!(service = service.name(), bytes = input.len(), "Uploading for compression");
    let compressed = service.compress(&input)?;
    fs::write(path, &compressed.data)?;

    let stats = CompressionStats {
        input_size: input.len() as u64,
        output_size: compressed.data.len() as u64,
        compression_count: compressed.compression_count,
    };
    info!(
        input = stats.input_size,
        output = stats.output_size,
        count = ?stats.compression_count,
        "Compressed {} and saved to the same location",
        path.file_name().unwrap_or_default().to_string_lossy()
    );

    Ok(stats)
}
