//! Image loading collaborator.

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Asset loading errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Image {url} unavailable: {reason}")]
    Unavailable { url: String, reason: String },
    #[error("Unsupported image source: {0}")]
    Unsupported(String),
    #[error("Image element {0} has no source")]
    MissingSource(String),
    #[error("Image {0} has not been loaded")]
    NotLoaded(String),
}

/// Decoded image metadata. Pixel data stays with the host renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
}

/// Resolves an image URL once its pixel data is available.
pub trait ImageLoader {
    fn load(&self, url: &str) -> BoxFuture<'_, Result<LoadedImage, AssetError>>;
}

/// Loader that rejects every request. For sessions without image support.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImages;

impl ImageLoader for NoImages {
    fn load(&self, url: &str) -> BoxFuture<'_, Result<LoadedImage, AssetError>> {
        let url = url.to_string();
        Box::pin(async move { Err(AssetError::Unsupported(url)) })
    }
}
