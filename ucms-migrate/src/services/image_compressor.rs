//! Image compression before upload
//!
//! Raster images are shrunk to fit a maximum dimension and re-encoded as
//! lossless WebP. Vector images and animated GIFs pass through untouched.
//! Lossless WebP is often larger than a JPEG photo; when no resize was needed
//! and the re-encode did not shrink the file, the original is kept.

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::codecs::gif::GifDecoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{AnimationDecoder, DynamicImage};
use std::io::Cursor;

/// Default longest-edge limit in pixels
pub const DEFAULT_MAX_DIMENSION: u32 = 1920;

const SVG_MIME: &str = "image/svg+xml";
const GIF_MIME: &str = "image/gif";
const WEBP_MIME: &str = "image/webp";

/// Compressor output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    /// File extension without the dot
    pub extension: String,
}

/// Image transcoder used before every upload
#[async_trait]
pub trait ImageCompressor: Send + Sync {
    async fn compress(&self, bytes: Vec<u8>, mime_type: &str) -> Result<CompressedImage>;
}

/// Resize + lossless WebP re-encode
#[derive(Debug, Clone)]
pub struct WebpCompressor {
    max_dimension: u32,
}

impl WebpCompressor {
    pub fn new(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
        }
    }

    /// Synchronous core, run on the blocking pool
    fn compress_blocking(
        bytes: Vec<u8>,
        mime_type: &str,
        max_dimension: u32,
    ) -> Result<CompressedImage> {
        if mime_type == SVG_MIME {
            return Ok(passthrough(bytes, mime_type, "svg"));
        }

        if mime_type == GIF_MIME && is_animated_gif(&bytes) {
            return Ok(passthrough(bytes, mime_type, "gif"));
        }

        let decoded = image::load_from_memory(&bytes).context("Failed to decode image")?;
        let needs_resize = decoded.width() > max_dimension || decoded.height() > max_dimension;
        let resized = fit_within(decoded, max_dimension);
        let rgba = DynamicImage::ImageRgba8(resized.to_rgba8());

        let mut encoded = Vec::new();
        rgba.write_with_encoder(WebPEncoder::new_lossless(&mut encoded))
            .context("Failed to encode WebP")?;

        if !needs_resize && encoded.len() >= bytes.len() {
            tracing::debug!(
                original = bytes.len(),
                webp = encoded.len(),
                "WebP not smaller; keeping original image"
            );
            return Ok(passthrough(bytes, mime_type, original_extension(mime_type)));
        }

        Ok(CompressedImage {
            bytes: encoded,
            mime_type: WEBP_MIME.to_string(),
            extension: "webp".to_string(),
        })
    }
}

impl Default for WebpCompressor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DIMENSION)
    }
}

#[async_trait]
impl ImageCompressor for WebpCompressor {
    async fn compress(&self, bytes: Vec<u8>, mime_type: &str) -> Result<CompressedImage> {
        let mime_type = mime_type.to_string();
        let max_dimension = self.max_dimension;

        tokio::task::spawn_blocking(move || {
            WebpCompressor::compress_blocking(bytes, &mime_type, max_dimension)
        })
        .await
        .context("Image compression task failed")?
    }
}

fn passthrough(bytes: Vec<u8>, mime_type: &str, extension: &str) -> CompressedImage {
    CompressedImage {
        bytes,
        mime_type: mime_type.to_string(),
        extension: extension.to_string(),
    }
}

/// Extension for an image kept in its original format
fn original_extension(mime_type: &str) -> &str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        other => other.rsplit('/').next().unwrap_or("bin"),
    }
}

/// More than one frame
fn is_animated_gif(bytes: &[u8]) -> bool {
    match GifDecoder::new(Cursor::new(bytes)) {
        Ok(decoder) => decoder.into_frames().take(2).count() > 1,
        Err(_) => false,
    }
}

/// Shrink to fit `max_dimension` on the longest edge, never enlarge
fn fit_within(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    if img.width() <= max_dimension && img.height() <= max_dimension {
        return img;
    }
    img.resize(max_dimension, max_dimension, FilterType::Lanczos3)
}
