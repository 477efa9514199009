//! Network operations
//!
//! HTTP client and the image downloader built on it.

pub mod client;
pub mod download;

// Re-export commonly used types
pub use client::{HttpClient, HttpFetch};
pub use download::Downloader;
