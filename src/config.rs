use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{AlignError, Result};

pub const DEFAULT_REFERENCE_CHANNEL: &str = "RGB_above";
pub const DEFAULT_TARGET_COLUMN: &str = "Time Recorded";

/// How to resolve several tracks of the same kind coming out of the demuxer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrackPolicy {
    /// Exactly one timestamp track and one status track, anything else is an error.
    #[default]
    Strict,
    /// The last track of each kind overwrites earlier ones.
    LastWins,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Channel name -> video file name inside `<id>/Data/`.
    pub channels: BTreeMap<String, String>,
    pub reference_channel: String,
    pub target_column: String,
    pub mkvextract: Option<PathBuf>,
    pub track_policy: TrackPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let channels = [
            ("RGB_above", "ImageRGB_ImageRGB-Sequence.mkv"),
            ("Depth_above", "ImageDEPTH_ImageDEPT-Sequence.mkv"),
            ("RGB_right", "Image1RGB_Image1RGB-Sequence.mkv"),
            ("Depth_right", "Image1DEPTH_Image1DE-Sequence.mkv"),
        ]
        .into_iter()
        .map(|(channel, file)| (channel.to_owned(), file.to_owned()))
        .collect();

        Self {
            channels,
            reference_channel: DEFAULT_REFERENCE_CHANNEL.to_owned(),
            target_column: DEFAULT_TARGET_COLUMN.to_owned(),
            mkvextract: None,
            track_policy: TrackPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Loads a JSON config, falling back to the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn channel_file(&self, channel: &str) -> Result<&str> {
        self.channels
            .get(channel)
            .map(String::as_str)
            .ok_or_else(|| AlignError::UnknownChannel(channel.to_owned()))
    }
}
