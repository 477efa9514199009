//! Compression service trait
//!
//! Defines the interface that remote image compressors implement.

use crate::error::CompressError;

/// Output of a successful compression call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compressed {
    /// Compressed image bytes
    pub data: Vec<u8>,
    /// Compressions used this billing period, if the service reports it
    pub compression_count: Option<u32>,
}

/// A remote service that shrinks image files
pub trait CompressionService {
    /// Display name for log output (e.g., "Tinify")
    fn name(&self) -> &'static str;

    /// Compress one image held in memory
    ///
    /// Implementations make a single attempt; failures are classified into
    /// [`CompressError`] categories.
    fn compress(&self, data: &[u8]) -> Result<Compressed, CompressError>;
}

impl<T: CompressionService + ?Sized> CompressionService for &T {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn compress(&self, data: &[u8]) -> Result<Compressed, CompressError> {
        (**self).compress(data)
    }
}
