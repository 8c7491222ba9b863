use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use label_timestamp_sync::{AlignError, MkvExtract, Pipeline, PipelineConfig};

/// Matches the frame timestamps of a sequence browser capture to a CSV label file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Capture archive, `<id>.<ext>`
    #[arg(long = "data_path", visible_alias = "data-path")]
    data_path: PathBuf,

    /// CSV label file whose timestamp column is replaced
    #[arg(long = "label_file_path", visible_alias = "label-file-path")]
    label_file_path: PathBuf,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Video channel to read the tracks from
    #[arg(long)]
    channel: Option<String>,

    /// Column to replace
    #[arg(long)]
    column: Option<String>,

    /// Path to the mkvextract binary
    #[arg(long)]
    mkvextract: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();

    let mut config = PipelineConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(channel) = args.channel {
        config.reference_channel = channel;
    }
    if let Some(column) = args.column {
        config.target_column = column;
    }
    if args.mkvextract.is_some() {
        config.mkvextract = args.mkvextract;
    }

    let demuxer = MkvExtract::locate(config.mkvextract.as_deref());
    let pipeline = Pipeline::new(config, demuxer);

    match pipeline.run(&args.data_path, &args.label_file_path) {
        Ok(report) => {
            log::info!(
                "{}: {} of {} frames recorded",
                report.video_id,
                report.frames_recorded,
                report.frames_total
            );
            if let Ok(json) = serde_json::to_string(&report) {
                log::debug!("Report: {json}");
            }
            println!("Successfully updated timestamps in CSV.");
            Ok(())
        }
        Err(AlignError::RowCountMismatch { rows, frames }) => {
            eprintln!(
                "Number of frames is not consistent between sequence browser and label file.\n\
                 Number of frames in CSV: {rows}\n\
                 Number of frames in sequence browser: {frames}\n\
                 Aborting."
            );
            std::process::exit(1);
        }
        Err(e) => Err(e).with_context(|| {
            format!(
                "Failed to match timestamps from {} to {}",
                args.data_path.display(),
                args.label_file_path.display()
            )
        }),
    }
}
