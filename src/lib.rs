/*

Capture archive layout:

  <id>.<ext>                      (zip container)
    <id>/Data/ImageRGB_ImageRGB-Sequence.mkv
    <id>/Data/...

The reference video carries three subtitle tracks, one payload per frame:
one with timestamps ("1650000000.033"), one with frame status ("0" = recorded),
and a third that parses as neither and is skipped.

*/

pub mod config;
pub mod error;
pub mod file;
pub mod labels;
pub mod mkv;
pub mod pipeline;
pub mod srt;
pub mod temp;
pub mod tracks;

pub use config::{PipelineConfig, TrackPolicy};
pub use error::{AlignError, Result};
pub use mkv::{MkvExtract, TrackDemuxer};
pub use pipeline::{AlignReport, Pipeline, Recovered};
