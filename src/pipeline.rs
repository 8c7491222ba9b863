use std::path::Path;

use serde::Serialize;

use crate::{
    config::PipelineConfig,
    error::Result,
    labels::update_column,
    mkv::{TrackDemuxer, extract_tracks},
    temp::ArchiveStage,
    tracks::{classify_tracks, recover_timestamps},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignReport {
    pub video_id: String,
    pub frames_total: usize,
    pub frames_recorded: usize,
    pub rows_updated: usize,
}

/// Timestamps of the recorded frames of one capture.
#[derive(Debug, Clone, PartialEq)]
pub struct Recovered {
    pub video_id: String,
    pub frames_total: usize,
    pub timestamps: Vec<f64>,
}

/// Archive in, label column out. One run per capture session.
pub struct Pipeline<D: TrackDemuxer> {
    config: PipelineConfig,
    demuxer: D,
}

impl<D: TrackDemuxer> Pipeline<D> {
    pub fn new(config: PipelineConfig, demuxer: D) -> Self {
        Self { config, demuxer }
    }

    /// Recovers the timestamps of recorded frames from the capture archive.
    /// The extracted working directory is gone by the time this returns, `Ok` or not.
    pub fn recover(&self, data_path: impl AsRef<Path>) -> Result<Recovered> {
        let stage = ArchiveStage::extract(data_path.as_ref())?;
        let video = stage.video_path(&self.config, &self.config.reference_channel)?;

        let tracks = extract_tracks(&self.demuxer, &video)?;
        let classified = classify_tracks(&tracks, self.config.track_policy)?;
        let timestamps = recover_timestamps(&classified.timestamps, &classified.status)?;

        let recovered = Recovered {
            video_id: stage.id().to_owned(),
            frames_total: classified.timestamps.len(),
            timestamps,
        };
        stage.close()?;
        Ok(recovered)
    }

    pub fn run(
        &self,
        data_path: impl AsRef<Path>,
        label_path: impl AsRef<Path>,
    ) -> Result<AlignReport> {
        let recovered = self.recover(data_path)?;
        let rows_updated = update_column(
            label_path,
            &self.config.target_column,
            &recovered.timestamps,
        )?;

        Ok(AlignReport {
            video_id: recovered.video_id,
            frames_total: recovered.frames_total,
            frames_recorded: recovered.timestamps.len(),
            rows_updated,
        })
    }
}
