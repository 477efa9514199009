//! dailypic: daily wallpaper fetcher
//!
//! Downloads the wallpaper published for a date, converts it to PNG and
//! shrinks it through a compression service.
//!
//! ## Quick start
//!
//! ```no_run
//! use dailypic::{Date, Pipeline, Settings};
//!
//! let settings = Settings::load(None)?;
//! let report = Pipeline::from_settings(&settings)?.run(&Date::today())?;
//! println!("{}", report.downloaded.display());
//! # Ok::<(), dailypic::PicError>(())
//! ```

pub mod compress;
pub mod config;
pub mod convert;
pub mod date;
pub mod error;
pub mod metadata;
pub mod network;
pub mod pipeline;
pub mod retry;
pub mod settings;

pub use date::Date;
pub use error::{CompressError, PicError, Result};
pub use pipeline::{CompressionOutcome, Pipeline, RunReport};
pub use retry::RetryPolicy;
pub use settings::{ApiKeySource, Settings};
