//! dailypic CLI: fetch, convert and compress the daily wallpaper

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use dailypic::compress::{compress_file, CompressionService, TinifyClient};
use dailypic::convert::convert_to_png;
use dailypic::{CompressionOutcome, Date, Pipeline, Settings};

#[derive(Parser)]
#[command(name = "dailypic", about = "Daily wallpaper fetcher", version)]
struct Cli {
    /// Config file to read instead of ./config.ini
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Download today's image, convert it to PNG and compress it (default)
    Run(RunArgs),
    /// Convert a file, or every file in a directory, to PNG
    Convert {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Compress an image in place
    Compress { path: PathBuf },
}

#[derive(Args, Default)]
struct RunArgs {
    /// Fetch the image for this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    date: Option<Date>,

    /// Directory to download into
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Stop after PNG conversion
    #[arg(long)]
    skip_compress: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    debug!(?settings, "Settings resolved");

    let result = match cli.command.unwrap_or_else(|| Command::Run(RunArgs::default())) {
        Command::Run(args) => run(settings, args),
        Command::Convert { path } => {
            convert(&path);
            Ok(())
        }
        Command::Compress { path } => compress(&settings, &path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "dailypic=debug,dailypic_cli=debug"
    } else {
        "dailypic=info,dailypic_cli=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Full pipeline. Stage failures are logged and end the run quietly; only a
/// pipeline that cannot be built is an error.
fn run(settings: Settings, args: RunArgs) -> dailypic::Result<()> {
    let settings = match args.output_dir {
        Some(dir) => settings.with_output_dir(dir),
        None => settings,
    };
    let date = args.date.unwrap_or_else(Date::today);

    let mut pipeline = Pipeline::from_settings(&settings)?;
    if args.skip_compress {
        pipeline = pipeline.without_compression();
    } else {
        warn_if_placeholder(&settings);
    }

    let report = match pipeline.run(&date) {
        Ok(report) => report,
        Err(e) => {
            warn!("{e}");
            return Ok(());
        }
    };

    if let CompressionOutcome::Failed(e) = &report.compression {
        warn!("{e}");
    }

    let result = report.png.as_ref().unwrap_or(&report.downloaded);
    println!("{}", result.display());
    Ok(())
}

/// Convert stage on its own. Failures are logged; the exit status stays 0.
fn convert(path: &Path) {
    let report = match convert_to_png(path) {
        Ok(report) => report,
        Err(e) => {
            warn!("{e}");
            return;
        }
    };
    info!(
        converted = report.converted.len(),
        skipped = report.already_png.len() + report.not_images.len(),
        failed = report.failed.len(),
        "Conversion finished"
    );
}

/// Compress stage on its own. Failures are logged; the exit status stays 0
/// unless the HTTP client cannot be built.
fn compress(settings: &Settings, path: &Path) -> dailypic::Result<()> {
    warn_if_placeholder(settings);
    let client = TinifyClient::new(settings.api_key.clone())?;
    compress_with(path, &client);
    Ok(())
}

fn compress_with<S: CompressionService>(path: &Path, service: &S) {
    if let Err(e) = compress_file(path, service) {
        warn!(path = %path.display(), "{e}");
    }
}

fn warn_if_placeholder(settings: &Settings) {
    if settings.has_api_key() {
        info!(source = %settings.api_key_source, "Using Tinify API key");
    } else {
        warn!("No Tinify API key configured; set [tinify] api_key in config.ini or TINIFY_API_KEY");
    }
}
