use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use label_timestamp_sync::{AlignError, Pipeline, PipelineConfig, Result, TrackDemuxer};
use zip::write::SimpleFileOptions;

/// Stands in for mkvextract: writes canned payloads as SRT files.
struct FakeDemuxer {
    tracks: [Vec<String>; 3],
}

impl FakeDemuxer {
    fn new(tracks: [&[&str]; 3]) -> Self {
        Self {
            tracks: tracks.map(|t| t.iter().map(|s| s.to_string()).collect()),
        }
    }
}

fn to_srt(payloads: &[String]) -> String {
    let mut out = String::new();
    for (i, payload) in payloads.iter().enumerate() {
        let start = i * 33;
        let end = start + 33;
        out.push_str(&format!(
            "{}\n00:00:{:02},{:03} --> 00:00:{:02},{:03}\n{payload}\n\n",
            i + 1,
            start / 1000,
            start % 1000,
            end / 1000,
            end % 1000
        ));
    }
    out
}

impl TrackDemuxer for FakeDemuxer {
    fn demux(&self, video: &Path, outputs: &[PathBuf; 3]) -> Result<()> {
        assert!(video.is_file(), "video should exist in the extracted tree");
        for (output, payloads) in outputs.iter().zip(&self.tracks) {
            fs::write(output, to_srt(payloads))?;
        }
        Ok(())
    }
}

fn write_capture(dir: &Path, id: &str) -> PathBuf {
    let archive = dir.join(format!("{id}.mrb"));
    let mut writer = zip::ZipWriter::new(File::create(&archive).unwrap());
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    writer
        .start_file(format!("{id}/Data/ImageRGB_ImageRGB-Sequence.mkv"), options)
        .unwrap();
    writer.write_all(b"matroska").unwrap();
    writer
        .start_file(format!("{id}/Data/Image1RGB_Image1RGB-Sequence.mkv"), options)
        .unwrap();
    writer.write_all(b"matroska").unwrap();
    writer.finish().unwrap();
    archive
}

fn write_labels(dir: &Path, rows: usize) -> PathBuf {
    let path = dir.join("labels.csv");
    let mut content = String::from("FileName,Time Recorded,Tool\n");
    for i in 0..rows {
        content.push_str(&format!("frame_{i:04}.jpg,,none\n"));
    }
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn full_run_updates_labels_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_capture(dir.path(), "session01");
    let archive_bytes = fs::read(&archive).unwrap();
    let labels = write_labels(dir.path(), 3);

    let demuxer = FakeDemuxer::new([
        &["Camera", "Camera", "Camera", "Camera", "Camera"],
        &["1650000000.0", "1650000000.033", "1650000000.067", "1650000000.1", "1650000000.133"],
        &["0", "1", "0", "2", "0"],
    ]);
    let pipeline = Pipeline::new(PipelineConfig::default(), demuxer);
    let report = pipeline.run(&archive, &labels).unwrap();

    assert_eq!(report.video_id, "session01");
    assert_eq!(report.frames_total, 5);
    assert_eq!(report.frames_recorded, 3);
    assert_eq!(report.rows_updated, 3);
    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        serde_json::json!({
            "video_id": "session01",
            "frames_total": 5,
            "frames_recorded": 3,
            "rows_updated": 3
        })
    );

    assert_eq!(
        fs::read_to_string(&labels).unwrap(),
        "FileName,Time Recorded,Tool\n\
         frame_0000.jpg,1650000000.0,none\n\
         frame_0001.jpg,1650000000.067,none\n\
         frame_0002.jpg,1650000000.133,none\n"
    );
    assert!(!dir.path().join("session01_extracted").exists());
    assert_eq!(fs::read(&archive).unwrap(), archive_bytes);
}

#[test]
fn row_count_mismatch_leaves_labels_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_capture(dir.path(), "session02");
    let labels = write_labels(dir.path(), 100);
    let before = fs::read(&labels).unwrap();

    let timestamps: Vec<String> = (0..100).map(|i| format!("{:.3}", i as f64 / 30.0)).collect();
    let status: Vec<String> = (0..100)
        .map(|i| if i % 40 == 7 { "1" } else { "0" }.to_owned())
        .collect();
    let demuxer = FakeDemuxer {
        tracks: [timestamps, status, vec!["n/a".to_owned(); 100]],
    };
    let pipeline = Pipeline::new(PipelineConfig::default(), demuxer);

    match pipeline.run(&archive, &labels) {
        Err(AlignError::RowCountMismatch { rows, frames }) => {
            assert_eq!(rows, 100);
            assert_eq!(frames, 97);
        }
        other => panic!("expected a row count mismatch, got {other:?}"),
    }
    assert_eq!(fs::read(&labels).unwrap(), before);
    assert!(!dir.path().join("session02_extracted").exists());
    assert!(archive.is_file());
}

#[test]
fn classification_failure_still_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_capture(dir.path(), "session03");
    let labels = write_labels(dir.path(), 2);

    let demuxer = FakeDemuxer::new([
        &["0.0", "0.033", "0.067"],
        &["0", "1", "0"],
        &["0", "0", "0"],
    ]);
    let pipeline = Pipeline::new(PipelineConfig::default(), demuxer);

    assert!(matches!(
        pipeline.run(&archive, &labels),
        Err(AlignError::AmbiguousTrack { .. })
    ));
    assert!(!dir.path().join("session03_extracted").exists());
    assert!(archive.is_file());
}

#[test]
fn other_channel_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_capture(dir.path(), "session04");

    let config = PipelineConfig {
        reference_channel: "RGB_right".to_owned(),
        ..Default::default()
    };
    let demuxer = FakeDemuxer::new([&["3.5", "3.6"], &["0", "0"], &["x", "y"]]);
    let recovered = Pipeline::new(config, demuxer).recover(&archive).unwrap();
    assert_eq!(recovered.timestamps, vec![3.5, 3.6]);

    let config = PipelineConfig {
        reference_channel: "Depth_right".to_owned(),
        ..Default::default()
    };
    let demuxer = FakeDemuxer::new([&["3.5"], &["0"], &["x"]]);
    assert!(matches!(
        Pipeline::new(config, demuxer).recover(&archive),
        Err(AlignError::MissingVideo(_))
    ));
    assert!(!dir.path().join("session04_extracted").exists());
}

#[test]
fn bad_archive_name() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("session.05.mrb");
    fs::write(&archive, b"").unwrap();
    let demuxer = FakeDemuxer::new([&["0.1"], &["0"], &["x"]]);
    let pipeline = Pipeline::new(PipelineConfig::default(), demuxer);
    assert!(matches!(
        pipeline.recover(&archive),
        Err(AlignError::ArchiveName(_))
    ));
}
