use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use crate::{
    config::PipelineConfig,
    error::{AlignError, Result},
    file::{ArchiveName, channel_video_path, remove_dir_if_exists},
};

/// An unpacked capture archive.
///
/// The archive is read in place whatever its extension and is never renamed or copied.
/// The extracted directory lives next to the archive as `<id>_extracted/` and is
/// removed when the stage is closed or dropped, whichever comes first.
#[derive(Debug)]
pub struct ArchiveStage {
    name: ArchiveName,
    extracted_dir: PathBuf,
    removed: bool,
}

impl ArchiveStage {
    pub fn extract(archive: impl AsRef<Path>) -> Result<Self> {
        let archive = archive.as_ref();
        let name = ArchiveName::parse(archive)?;
        let data_dir = archive.parent().unwrap_or_else(|| Path::new(""));
        let extracted_dir = data_dir.join(name.extracted_dir_name());

        if !extracted_dir.exists() {
            fs::create_dir(&extracted_dir)?;
        }

        // From here on the guard owns the directory, so every exit path cleans up.
        let stage = Self {
            name,
            extracted_dir,
            removed: false,
        };

        log::info!(
            "Extracting \"{}\" to \"{}\"",
            archive.display(),
            stage.extracted_dir.display()
        );

        let mut zip = zip::ZipArchive::new(File::open(archive)?)?;
        zip.extract(&stage.extracted_dir)?;
        log::debug!("Unpacked {} entries", zip.len());

        Ok(stage)
    }

    pub fn id(&self) -> &str {
        &self.name.id
    }

    pub fn extracted_dir(&self) -> &Path {
        &self.extracted_dir
    }

    /// Path of `channel`'s video inside the extracted tree.
    pub fn video_path(&self, config: &PipelineConfig, channel: &str) -> Result<PathBuf> {
        let file = config.channel_file(channel)?;
        let path = channel_video_path(&self.extracted_dir, &self.name.id, file);
        if !path.is_file() {
            return Err(AlignError::MissingVideo(path));
        }
        Ok(path)
    }

    /// Removes the extracted directory, reporting failures instead of logging them.
    pub fn close(mut self) -> Result<()> {
        self.removed = true;
        remove_dir_if_exists(&self.extracted_dir)?;
        log::debug!("Removed {}", self.extracted_dir.display());
        Ok(())
    }
}

impl Drop for ArchiveStage {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = remove_dir_if_exists(&self.extracted_dir) {
            log::warn!(
                "Failed to remove extracted directory {}: {e}",
                self.extracted_dir.display()
            );
        }
    }
}
