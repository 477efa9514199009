//! Run orchestration
//!
//! date → metadata → download → PNG conversion → compression. A stage runs
//! only when the previous one produced a file.

use crate::compress::{compress_file, CompressionService, CompressionStats, TinifyClient};
use crate::convert::{convert_to_png, is_png, ConversionReport};
use crate::date::Date;
use crate::error::{PicError, Result};
use crate::metadata::MetadataFetcher;
use crate::network::{Downloader, HttpClient, HttpFetch};
use crate::settings::Settings;

use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What happened at the compression stage
#[derive(Debug)]
pub enum CompressionOutcome {
    Compressed(CompressionStats),
    /// No compressor configured for this run
    Disabled,
    /// Conversion produced no PNG to compress
    NoPng,
    Failed(PicError),
}

/// Result of a run that got as far as downloading an image
#[derive(Debug)]
pub struct RunReport {
    pub date: Date,
    /// The file as downloaded
    pub downloaded: PathBuf,
    /// The PNG handed to the compressor
    pub png: Option<PathBuf>,
    pub conversion: ConversionReport,
    pub compression: CompressionOutcome,
}

/// The full fetch-convert-compress sequence
pub struct Pipeline<F, D, S> {
    fetcher: MetadataFetcher<F>,
    downloader: Downloader<D>,
    compressor: Option<S>,
    output_dir: PathBuf,
}

impl Pipeline<HttpClient, HttpClient, TinifyClient> {
    /// Production pipeline wired from resolved settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = HttpClient::new()?;
        Ok(Self::new(
            MetadataFetcher::with_base_url(http.clone(), settings.base_url.clone()),
            Downloader::with_policy(http.clone(), settings.retry),
            Some(TinifyClient::with_client(&http, settings.api_key.clone())),
            settings.output_dir.clone(),
        ))
    }
}

impl<F, D, S> Pipeline<F, D, S>
where
    F: HttpFetch,
    D: HttpFetch,
    S: CompressionService,
{
    pub fn new(
        fetcher: MetadataFetcher<F>,
        downloader: Downloader<D>,
        compressor: Option<S>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            downloader,
            compressor,
            output_dir: output_dir.into(),
        }
    }

    /// Stop after conversion
    pub fn without_compression(mut self) -> Self {
        self.compressor = None;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run every stage for `date`
    ///
    /// Errors from the metadata and download stages end the run. Conversion
    /// and compression problems are recorded in the report instead, since a
    /// file already exists on disk by then.
    pub fn run(&self, date: &Date) -> Result<RunReport> {
        info!(%date, "Fetching daily image");
        let downloaded = self
            .fetcher
            .fetch_image(date, &self.downloader, &self.output_dir)?;

        let conversion = convert_to_png(&downloaded)?;
        let png = if is_png(&downloaded) {
            Some(downloaded.clone())
        } else {
            conversion.png_for(&downloaded).map(Path::to_path_buf)
        };

        let compression = match (&png, &self.compressor) {
            (_, None) => CompressionOutcome::Disabled,
            (None, Some(_)) => {
                warn!(file = %downloaded.display(), "No PNG produced; skipping compression");
                CompressionOutcome::NoPng
            }
            (Some(path), Some(service)) => match compress_file(path, service) {
                Ok(stats) => CompressionOutcome::Compressed(stats),
                Err(e) => CompressionOutcome::Failed(e),
            },
        };

        Ok(RunReport {
            date: *date,
            downloaded,
            png,
            conversion,
            compression,
        })
    }
}
