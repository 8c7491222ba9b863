use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Which side of the classification a track landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackRole {
    Timestamps,
    Status,
}

impl std::fmt::Display for TrackRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackRole::Timestamps => f.write_str("timestamp"),
            TrackRole::Status => f.write_str("frame status"),
        }
    }
}

/// Errors that can occur while aligning capture timestamps with a label file
#[derive(Debug, Error)]
pub enum AlignError {
    #[error("Invalid capture archive name '{0}': expected exactly one '.' separating id and extension")]
    ArchiveName(String),

    #[error("Track {track} has no payloads")]
    EmptyTrack { track: usize },

    #[error("More than one {kind} track found (tracks {tracks:?})")]
    AmbiguousTrack { kind: TrackRole, tracks: Vec<usize> },

    #[error("No timestamp track found among the extracted tracks")]
    NoTimestampTrack,

    #[error("No frame status track found among the extracted tracks")]
    NoStatusTrack,

    #[error("Timestamp track has {timestamps} frames but status track has {status}")]
    TrackLengthMismatch { timestamps: usize, status: usize },

    #[error(
        "Number of frames is not consistent between sequence browser and label file \
         (frames in CSV: {rows}, frames in sequence browser: {frames})"
    )]
    RowCountMismatch { rows: usize, frames: usize },

    #[error("Column '{column}' not found in {}", path.display())]
    ColumnNotFound { column: String, path: PathBuf },

    #[error("Unknown video channel '{0}'")]
    UnknownChannel(String),

    #[error("Video file not found: {}", .0.display())]
    MissingVideo(PathBuf),

    #[error("{} failed on {} with status {status}: {stderr}", tool.display(), video.display())]
    Demux {
        tool: PathBuf,
        video: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Subtitle format error in {} at line {line}: {message}", path.display())]
    SubtitleFormat {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AlignError>;
