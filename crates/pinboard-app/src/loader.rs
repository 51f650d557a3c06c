//! Filesystem image loader for the native shell.

use pinboard_core::{AssetError, BoxFuture, ImageLoader, LoadedImage};
use std::path::{Path, PathBuf};

/// Loads images from local paths or `file://` URLs, relative to a base directory.
///
/// Remote URLs are rejected: the headless shell has no network access.
pub struct FsImageLoader {
    base: PathBuf,
}

impl FsImageLoader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Map a record URL to a local path, or `None` for remote sources.
    fn resolve(&self, url: &str) -> Option<PathBuf> {
        if let Some(path) = url.strip_prefix("file://") {
            return Some(PathBuf::from(path));
        }
        if url.contains("://") || url.starts_with("data:") {
            return None;
        }
        let path = Path::new(url);
        Some(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        })
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&self, url: &str) -> BoxFuture<'_, Result<LoadedImage, AssetError>> {
        let url = url.to_string();
        let path = self.resolve(&url);
        Box::pin(async move {
            let path = path.ok_or_else(|| AssetError::Unsupported(url.clone()))?;
            let (width, height) = image::image_dimensions(&path).map_err(|e| AssetError::Unavailable {
                url: url.clone(),
                reason: e.to_string(),
            })?;
            log::debug!("Loaded image {} ({}x{})", path.display(), width, height);
            Ok(LoadedImage { width, height })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_relative_png() {
        let dir = tempdir().unwrap();
        image::RgbaImage::new(3, 2).save(dir.path().join("dot.png")).unwrap();

        let loader = FsImageLoader::new(dir.path());
        let image = pollster::block_on(loader.load("dot.png")).unwrap();
        assert_eq!(image, LoadedImage { width: 3, height: 2 });
    }

    #[test]
    fn test_load_file_url() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dot.png");
        image::RgbaImage::new(4, 4).save(&path).unwrap();

        let loader = FsImageLoader::new("/nonexistent");
        let url = format!("file://{}", path.display());
        assert!(pollster::block_on(loader.load(&url)).is_ok());
    }

    #[test]
    fn test_remote_url_is_unsupported() {
        let loader = FsImageLoader::new(".");
        let err = pollster::block_on(loader.load("https://example/x.png")).unwrap_err();
        assert_eq!(err, AssetError::Unsupported("https://example/x.png".to_string()));
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempdir().unwrap();
        let loader = FsImageLoader::new(dir.path());
        let err = pollster::block_on(loader.load("missing.png")).unwrap_err();
        assert!(matches!(err, AssetError::Unavailable { .. }));
    }
}
