use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{AlignError, Result};

/// Name of a capture archive, `<id>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveName {
    pub id: String,
    pub extension: String,
}

impl ArchiveName {
    pub fn parse(path: impl AsRef<Path>) -> Result<Self> {
        let file_name = path
            .as_ref()
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| AlignError::ArchiveName(path.as_ref().display().to_string()))?;

        match file_name.split('.').collect::<Vec<_>>().as_slice() {
            [id, extension] if !id.is_empty() && !extension.is_empty() => Ok(Self {
                id: (*id).to_owned(),
                extension: (*extension).to_owned(),
            }),
            _ => Err(AlignError::ArchiveName(file_name.to_owned())),
        }
    }

    pub fn extracted_dir_name(&self) -> String {
        format!("{}_extracted", self.id)
    }
}

/// `<extracted>/<id>/Data/<file>`
pub fn channel_video_path(extracted_dir: &Path, id: &str, file: &str) -> PathBuf {
    extracted_dir.join(id).join("Data").join(file)
}

/// Sibling subtitle files the demuxer writes next to `video`: `<stem>1.srt` .. `<stem>3.srt`.
pub fn track_output_paths(video: &Path) -> [PathBuf; 3] {
    let stem = video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = video.parent().unwrap_or_else(|| Path::new(""));

    [1, 2, 3].map(|n| dir.join(format!("{stem}{n}.srt")))
}

pub fn remove_dir_if_exists(dir: &Path) -> std::io::Result<bool> {
    if dir.is_dir() {
        fs::remove_dir_all(dir)?;
        return Ok(true);
    }
    Ok(false)
}
