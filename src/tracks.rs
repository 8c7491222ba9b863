use std::str::FromStr;

use crate::{
    config::TrackPolicy,
    error::{AlignError, Result, TrackRole},
};

/// Frame status meaning the frame was actually recorded.
pub const STATUS_RECORDED: i64 = 0;

/// What one demuxed track turned out to carry.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackKind {
    Timestamps(Vec<f64>),
    Status(Vec<i64>),
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedTracks {
    pub timestamps: Vec<f64>,
    pub status: Vec<i64>,
}

fn parse_all<T: FromStr>(payloads: &[String]) -> Option<Vec<T>> {
    payloads.iter().map(|p| p.trim().parse::<T>().ok()).collect()
}

/// Decides the kind of a track from its first payload: a decimal point means
/// timestamps, anything else is read as integer status flags.
///
/// `track` is the 1-based track number, used only for error reporting.
pub fn classify_track(track: usize, payloads: &[String]) -> Result<TrackKind> {
    let first = payloads.first().ok_or(AlignError::EmptyTrack { track })?;

    let kind = if first.contains('.') {
        parse_all(payloads).map(TrackKind::Timestamps)
    } else {
        parse_all(payloads).map(TrackKind::Status)
    };

    Ok(kind.unwrap_or_else(|| {
        log::warn!("Track {track} could not be parsed, ignoring it");
        TrackKind::Unrecognized
    }))
}

/// Picks the timestamp track and the status track out of the demuxed tracks.
pub fn classify_tracks(tracks: &[Vec<String>], policy: TrackPolicy) -> Result<ClassifiedTracks> {
    let mut timestamps: Vec<(usize, Vec<f64>)> = Vec::new();
    let mut status: Vec<(usize, Vec<i64>)> = Vec::new();

    for (i, payloads) in tracks.iter().enumerate() {
        let track = i + 1;
        match classify_track(track, payloads)? {
            TrackKind::Timestamps(values) => {
                log::debug!("Track {track}: timestamps ({} frames)", values.len());
                timestamps.push((track, values));
            }
            TrackKind::Status(values) => {
                log::debug!("Track {track}: frame status ({} frames)", values.len());
                status.push((track, values));
            }
            TrackKind::Unrecognized => {}
        }
    }

    let timestamps = pick(timestamps, TrackRole::Timestamps, policy)?
        .ok_or(AlignError::NoTimestampTrack)?;
    let status = pick(status, TrackRole::Status, policy)?.ok_or(AlignError::NoStatusTrack)?;

    Ok(ClassifiedTracks { timestamps, status })
}

fn pick<T>(
    mut candidates: Vec<(usize, Vec<T>)>,
    kind: TrackRole,
    policy: TrackPolicy,
) -> Result<Option<Vec<T>>> {
    if candidates.len() > 1 {
        let tracks: Vec<usize> = candidates.iter().map(|(track, _)| *track).collect();
        match policy {
            TrackPolicy::Strict => return Err(AlignError::AmbiguousTrack { kind, tracks }),
            TrackPolicy::LastWins => {
                log::warn!("Several {kind} tracks {tracks:?}, using the last one");
            }
        }
    }
    Ok(candidates.pop().map(|(_, values)| values))
}

/// Keeps the timestamps of frames whose status is [`STATUS_RECORDED`], in frame order.
pub fn recover_timestamps(timestamps: &[f64], status: &[i64]) -> Result<Vec<f64>> {
    if timestamps.len() != status.len() {
        return Err(AlignError::TrackLengthMismatch {
            timestamps: timestamps.len(),
            status: status.len(),
        });
    }

    let recovered: Vec<f64> = timestamps
        .iter()
        .zip(status)
        .filter(|(_, s)| **s == STATUS_RECORDED)
        .map(|(t, _)| *t)
        .collect();

    log::info!(
        "{} of {} frames were recorded",
        recovered.len(),
        timestamps.len()
    );
    Ok(recovered)
}
