use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use pose_csv::{BatchConverter, PoseCsvConfig};

#[derive(Parser, Debug)]
#[command(name = "pose-csv")]
#[command(about = "Convert per-frame pose keypoint JSON files into one labeled CSV table per video")]
#[command(version)]
#[command(long_about = "Reads every subdirectory of SOURCE as one video made of per-frame \
OpenPose-style keypoint JSON files, orders the frames naturally by file name, and writes one \
table per video into DESTINATION. Columns carry a four-level label: pose set, body part, \
landmark and coordinate.")]
struct Args {
    /// Directory containing one subdirectory of keyframe files per video
    #[arg(required_unless_present_any = ["print_config", "validate_config"])]
    source: Option<PathBuf>,

    /// Directory receiving one table per video
    #[arg(required_unless_present_any = ["print_config", "validate_config"])]
    destination: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, default_value = "pose-csv.toml", help = "Path to TOML configuration file")]
    config: PathBuf,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without converting")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Dry run mode - list planned outputs without writing
    #[arg(long, help = "List videos, frame counts and output paths without writing anything")]
    dry_run: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Handle special modes that don't require full initialization
    if args.print_config {
        return print_default_config();
    }

    init_logging(&args)?;

    info!("Starting pose-csv v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config.display());

    let config = PoseCsvConfig::load_from_file(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        eprintln!("✗ Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    if args.validate_config {
        info!("Configuration validation successful");
        println!("✓ Configuration is valid");
        return Ok(());
    }

    let (Some(source), Some(destination)) = (args.source.as_deref(), args.destination.as_deref())
    else {
        bail!("SOURCE and DESTINATION are required");
    };

    let batch = BatchConverter::new(&config).context("Failed to prepare converter")?;

    if args.dry_run {
        let plan = batch
            .plan(source, destination)
            .context("Failed to plan conversion")?;
        for video in &plan.videos {
            println!(
                "{} ({} frames) -> {}",
                video.source_dir.display(),
                video.frame_count,
                video.output_path.display()
            );
        }
        println!("✓ Dry run completed - {} video(s) planned", plan.videos.len());
        return Ok(());
    }

    let summary = batch
        .run(source, destination)
        .map_err(|e| {
            error!("Conversion failed: {}", e);
            e
        })
        .with_context(|| format!("Failed to convert {}", source.display()))?;

    info!(
        "Finished: {} table(s) written to {}",
        summary.videos.len(),
        destination.display()
    );
    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    // Determine log level based on flags
    let log_level = if args.debug {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "info"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pose_csv={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .boxed(),
        Some("pretty") => fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .with_writer(std::io::stderr)
            .boxed(),
        Some("compact") | None => fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr)
                .boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

/// Print default configuration in TOML format
fn print_default_config() -> Result<()> {
    let text = toml::to_string_pretty(&PoseCsvConfig::default())
        .context("Failed to serialize default configuration")?;

    println!("# pose-csv configuration file");
    println!("# Keys may also be set through POSE_CSV_<SECTION>__<KEY> environment variables");
    println!();
    println!("{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_config_needs_no_paths() {
        let args = Args::try_parse_from(["pose-csv", "--validate-config"]).unwrap();
        assert!(args.validate_config);
        assert!(args.source.is_none());
        assert!(args.destination.is_none());
    }

    #[test]
    fn test_print_config_needs_no_paths() {
        let args = Args::try_parse_from(["pose-csv", "--print-config"]).unwrap();
        assert!(args.print_config);
    }

    #[test]
    fn test_conversion_requires_both_paths() {
        assert!(Args::try_parse_from(["pose-csv"]).is_err());
        assert!(Args::try_parse_from(["pose-csv", "videos"]).is_err());

        let args = Args::try_parse_from(["pose-csv", "videos", "tables", "--dry-run"]).unwrap();
        assert_eq!(args.source, Some(PathBuf::from("videos")));
        assert_eq!(args.destination, Some(PathBuf::from("tables")));
        assert!(args.dry_run);
    }
}
