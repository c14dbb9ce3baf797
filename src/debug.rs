use std::path::PathBuf;

use image::DynamicImage;
use tracing::debug;

use crate::error::{CountError, Result};

/// Writes intermediate images of a run to a directory.
///
/// Files are numbered by stage: `00_input.png`, `01_binarized.png`,
/// `02_all_contours.png`, `03_accepted.png`.
#[derive(Clone, Debug)]
pub struct DebugOutput {
    output_dir: PathBuf,
}

impl DebugOutput {
    /// The directory must be empty or non-existent; it is created if missing.
    pub fn new(output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            if std::fs::read_dir(&output_dir)?.next().is_some() {
                return Err(CountError::DebugDirNotEmpty(output_dir));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }
        Ok(Self { output_dir })
    }

    pub fn save(&self, stage: usize, name: &str, image: &DynamicImage) -> Result<PathBuf> {
        let filename = format!("{:02}_{}.png", stage, name.to_lowercase().replace(' ', "_"));
        let path = self.output_dir.join(&filename);
        image.save(&path)?;
        debug!(path = %path.display(), "saved debug image");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_creates_missing_directory_and_names_stages() -> anyhow::Result<()> {
        let root = tempfile::TempDir::new()?;
        let dir = root.path().join("debug");
        let out = DebugOutput::new(dir.clone())?;
        assert!(dir.is_dir());

        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([9])));
        let path = out.save(1, "Binarized Mask", &img)?;
        assert_eq!(path, dir.join("01_binarized_mask.png"));
        assert!(path.is_file());
        Ok(())
    }

    #[test]
    fn test_rejects_non_empty_directory() -> anyhow::Result<()> {
        let root = tempfile::TempDir::new()?;
        std::fs::write(root.path().join("leftover.txt"), "x")?;
        let result = DebugOutput::new(root.path().to_path_buf());
        assert!(matches!(result, Err(CountError::DebugDirNotEmpty(_))));
        Ok(())
    }
}
