//! Image decoding and directory enumeration

use crate::error::{ImatchError, Result};
use crate::grid::PixelGrid;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Decode an image file into a three-channel B,G,R pixel grid.
pub fn decode(path: impl AsRef<Path>) -> Result<PixelGrid> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|e| ImatchError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let mut samples = Vec::with_capacity((width * height * 3) as usize);
    for pixel in rgb.pixels() {
        let [r, g, b] = pixel.0;
        samples.push(b);
        samples.push(g);
        samples.push(r);
    }
    PixelGrid::from_raw(height as usize, width as usize, 3, samples)
}

/// List regular files with the given extension (case-insensitive, no
/// leading dot) directly under a directory. Paths come back in filesystem
/// enumeration order, which is not stable across platforms.
pub fn list_images(dir: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(ImatchError::InvalidInput {
            reason: format!("{} is not a directory", dir.display()),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            ImatchError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let keep = entry
            .path()
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case(extension));
        if keep {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_decode_bgr_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("one.png");
        let mut img = image::RgbImage::new(3, 2);
        img.put_pixel(0, 0, image::Rgb([30, 20, 10]));
        img.save(&path).unwrap();

        let grid = decode(&path).unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.channels(), 3);
        // image gives R,G,B; the grid stores B,G,R.
        assert_eq!(grid.bgr(0, 0), (10, 20, 30));
    }

    #[test]
    fn test_decode_missing_file() {
        assert!(matches!(
            decode("does-not-exist.png"),
            Err(ImatchError::Decode { .. })
        ));
    }

    #[test]
    fn test_list_images_filters_extension() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("b.JPG"), b"x").unwrap();
        std::fs::write(dir.path().join("c.png"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("d.jpg"), b"x").unwrap();

        let mut found = list_images(dir.path(), "jpg").unwrap();
        found.sort();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        // Case-insensitive on extension; subdirectories are not entered.
        assert_eq!(names, vec!["a.jpg", "b.JPG"]);
    }

    #[test]
    fn test_list_images_missing_dir() {
        assert!(matches!(
            list_images("no-such-dir", "jpg"),
            Err(ImatchError::InvalidInput { .. })
        ));
    }
}
