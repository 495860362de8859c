use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{DynamicImage, ImageReader, RgbImage};
use time::OffsetDateTime;
use time::macros::format_description;

/// Default folder for annotated images
pub const DEFAULT_SAVE_FOLDER: &str = "Captured_PCB_Images";

/// File name for an annotated capture, e.g. `pcb_20240131_154502.jpg`
pub fn timestamped_filename(at: OffsetDateTime) -> Result<String> {
    let stamp = at.format(format_description!(
        "[year][month][day]_[hour][minute][second]"
    ))?;
    Ok(format!("pcb_{}.jpg", stamp))
}

/// Current local time, or UTC when the local offset cannot be determined
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Path for a new capture inside `dir`, creating the directory if needed
pub fn timestamped_path(dir: &Path, at: OffsetDateTime) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    Ok(dir.join(timestamped_filename(at)?))
}

pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let img = ImageReader::open(path)
        .with_context(|| format!("Could not open image {}", path.display()))?
        .with_guessed_format()?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image {}: {}", path.display(), e))?;
    Ok(img)
}

pub fn save_image(img: &RgbImage, path: &Path) -> Result<()> {
    img.save(path)
        .map_err(|e| anyhow::anyhow!("Failed to save image {}: {}", path.display(), e))
}
