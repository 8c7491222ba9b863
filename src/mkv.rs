use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Command,
};

use crate::{
    error::{AlignError, Result},
    file::track_output_paths,
    srt::read_payloads,
};

/// Splits the three side-channel tracks out of a capture video into subtitle files.
pub trait TrackDemuxer {
    fn demux(&self, video: &Path, outputs: &[PathBuf; 3]) -> Result<()>;
}

/// `mkvextract tracks <video> 1:<out1> 2:<out2> 3:<out3>`
#[derive(Debug, Clone)]
pub struct MkvExtract {
    tool: PathBuf,
}

impl MkvExtract {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self { tool: tool.into() }
    }

    /// Uses `tool` when given, then a bundled `third_party/bin` copy, then `PATH`.
    pub fn locate(tool: Option<&Path>) -> Self {
        match tool {
            Some(tool) => Self::new(tool),
            None => Self::new(third_party_binary("mkvextract")),
        }
    }

    pub fn tool(&self) -> &Path {
        &self.tool
    }
}

impl TrackDemuxer for MkvExtract {
    fn demux(&self, video: &Path, outputs: &[PathBuf; 3]) -> Result<()> {
        log::info!(
            "Extracting tracks from \"{}\" with {}",
            video.display(),
            self.tool.display()
        );

        let mut command = Command::new(&self.tool);
        command.arg("tracks").arg(video);
        for (n, output) in outputs.iter().enumerate() {
            let mut spec = OsString::from(format!("{}:", n + 1));
            spec.push(output.as_os_str());
            command.arg(spec);
        }

        let output = command.output()?;
        if !output.status.success() {
            log::debug!("stdout\n{}", String::from_utf8_lossy(&output.stdout));
            return Err(AlignError::Demux {
                tool: self.tool.clone(),
                video: video.to_path_buf(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        Ok(())
    }
}

fn third_party_binary(name: &str) -> PathBuf {
    let file_name = format!("{name}{}", std::env::consts::EXE_SUFFIX);
    let bundled = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("third_party")
        .join("bin")
        .join(&file_name);
    if bundled.is_file() {
        return bundled;
    }
    PathBuf::from(file_name)
}

/// Demuxes `video` and parses each of the three sibling subtitle files into payloads.
pub fn extract_tracks(demuxer: &dyn TrackDemuxer, video: &Path) -> Result<[Vec<String>; 3]> {
    let outputs = track_output_paths(video);
    demuxer.demux(video, &outputs)?;

    let [first, second, third] = &outputs;
    let tracks = [
        read_payloads(first)?,
        read_payloads(second)?,
        read_payloads(third)?,
    ];
    log::debug!(
        "Track lengths: {} / {} / {}",
        tracks[0].len(),
        tracks[1].len(),
        tracks[2].len()
    );

    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct CannedDemuxer(&'static [&'static str; 3]);

    impl TrackDemuxer for CannedDemuxer {
        fn demux(&self, _video: &Path, outputs: &[PathBuf; 3]) -> Result<()> {
            for (output, content) in outputs.iter().zip(self.0.iter()) {
                fs::write(output, content)?;
            }
            Ok(())
        }
    }

    struct NoOutput;

    impl TrackDemuxer for NoOutput {
        fn demux(&self, _video: &Path, _outputs: &[PathBuf; 3]) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn reads_three_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("cam.mkv");
        fs::write(&video, b"").unwrap();

        let demuxer = CannedDemuxer(&[
            "1\n00:00:00,000 --> 00:00:00,033\n0.5\n",
            "1\n00:00:00,000 --> 00:00:00,033\n0\n",
            "1\n00:00:00,000 --> 00:00:00,033\n3\n",
        ]);
        let tracks = extract_tracks(&demuxer, &video).unwrap();
        assert_eq!(tracks[0], vec!["0.5"]);
        assert_eq!(tracks[1], vec!["0"]);
        assert_eq!(tracks[2], vec!["3"]);
        assert!(dir.path().join("cam2.srt").is_file());
    }

    #[test]
    fn missing_output_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("cam.mkv");
        assert!(matches!(
            extract_tracks(&NoOutput, &video),
            Err(AlignError::Io(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_reports_demux_error() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("cam.mkv");
        let demuxer = MkvExtract::new("false");
        assert!(matches!(
            extract_tracks(&demuxer, &video),
            Err(AlignError::Demux { .. })
        ));
    }

    #[test]
    fn explicit_tool_wins() {
        let demuxer = MkvExtract::locate(Some(Path::new("/opt/mkvtoolnix/mkvextract")));
        assert_eq!(demuxer.tool(), Path::new("/opt/mkvtoolnix/mkvextract"));
    }
}
