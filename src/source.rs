/// Image sources: the offline watch folder and the live HTTP endpoint.
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::DynamicImage;

use crate::error::{Result, SpectrumError};

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|e| {
            let ext = e.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Most recently modified image file in the folder, if any.
pub fn latest_image_in(dir: &Path) -> Result<Option<PathBuf>> {
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || !is_image_file(&path) {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        let newer = match &newest {
            Some((t, _)) => modified > *t,
            None => true,
        };
        if newer {
            newest = Some((modified, path));
        }
    }
    Ok(newest.map(|(_, path)| path))
}

/// Move a handled image into a `processed/` subfolder next to it, so the
/// watch folder only ever holds unhandled captures.
pub fn move_to_processed(path: &Path) -> Result<PathBuf> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let processed = parent.join("processed");
    fs::create_dir_all(&processed)?;
    let file_name = path.file_name().ok_or_else(|| {
        SpectrumError::FrameProcessing(format!("no file name in {}", path.display()))
    })?;
    let dest = processed.join(file_name);
    fs::rename(path, &dest)?;
    Ok(dest)
}

/// Fetches single still frames from a network camera endpoint
/// (e.g. `http://device-ip:8080/shot.jpg`).
///
/// Blocking client: the live loop is single-threaded by design and the
/// fetch is its only suspension point.
pub struct FrameFetcher {
    client: reqwest::blocking::Client,
    url: String,
}

impl FrameFetcher {
    pub fn new(url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, url: url.to_string() })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and decode one frame. Any network or decode failure comes
    /// back as an error the live loop logs and skips.
    pub fn fetch_frame(&self) -> Result<DynamicImage> {
        let response = self.client.get(&self.url).send()?.error_for_status()?;
        let bytes = response.bytes()?;
        let image = image::load_from_memory(&bytes).map_err(|e| {
            SpectrumError::FrameProcessing(format!("decode from {}: {}", self.url, e))
        })?;
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("spectropix-{}", name));
        fs::remove_dir_all(&dir).ok();
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_latest_image_picks_newest_and_skips_others() {
        let dir = scratch_dir("latest");
        for (name, age_s) in [("old.jpg", 200u64), ("new.png", 10), ("notes.txt", 0)] {
            let path = dir.join(name);
            File::create(&path).unwrap().write_all(b"x").unwrap();
            let mtime = std::time::SystemTime::now() - Duration::from_secs(age_s);
            let f = File::open(&path).unwrap();
            f.set_modified(mtime).unwrap();
        }

        let latest = latest_image_in(&dir).unwrap().unwrap();
        assert_eq!(latest.file_name().unwrap(), "new.png");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_folder_yields_none() {
        let dir = scratch_dir("empty");
        assert!(latest_image_in(&dir).unwrap().is_none());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_move_to_processed() {
        let dir = scratch_dir("processed");
        let src = dir.join("shot.jpg");
        File::create(&src).unwrap().write_all(b"x").unwrap();

        let dest = move_to_processed(&src).unwrap();
        assert!(!src.exists());
        assert!(dest.exists());
        assert_eq!(dest.parent().unwrap().file_name().unwrap(), "processed");

        fs::remove_dir_all(&dir).ok();
    }
}
