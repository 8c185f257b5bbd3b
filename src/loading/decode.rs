//! Image file decoding into tightly packed RGBA8 buffers.

use std::path::Path;

use crate::error::{Result, ViewerError};

/// RGBA8 pixels, row-major, top row first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        Self { width, height, pixels }
    }

    /// Red channel of the texel at (x, y)
    #[inline]
    pub fn red(&self, x: u32, y: u32) -> u8 {
        self.pixels[((y * self.width + x) * 4) as usize]
    }

    fn from_rgba(image: image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw())
    }
}

/// Color image and depth map for one catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TexturePair {
    pub color: DecodedImage,
    pub depth: DecodedImage,
}

fn read_image(path: &Path) -> Result<image::DynamicImage> {
    let bytes = std::fs::read(path).map_err(|source| ViewerError::AssetIo {
        path: path.to_path_buf(),
        source,
    })?;
    // Format comes from the file contents, not the extension
    image::load_from_memory(&bytes).map_err(|source| ViewerError::ImageDecode {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode any supported image (webp, png, jpeg) to RGBA8.
pub fn decode_file(path: &Path) -> Result<DecodedImage> {
    let image = read_image(path)?;
    Ok(DecodedImage::from_rgba(image.to_rgba8()))
}

/// Decode for GPU upload, rejecting images wider or taller than
/// `max_dimension` texels.
pub fn decode_texture(path: &Path, max_dimension: u32) -> Result<DecodedImage> {
    let image = decode_file(path)?;
    if image.width > max_dimension || image.height > max_dimension {
        return Err(ViewerError::TextureTooLarge {
            path: path.to_path_buf(),
            width: image.width,
            height: image.height,
            max: max_dimension,
        });
    }
    Ok(image)
}

/// Decode, scale and center-crop to a `size` x `size` square.
pub fn decode_thumbnail(path: &Path, size: u32) -> Result<DecodedImage> {
    let image = read_image(path)?;
    let square = image.resize_to_fill(size, size, image::imageops::FilterType::Triangle);
    Ok(DecodedImage::from_rgba(square.to_rgba8()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_limit_applies_to_either_axis() {
        let dir = std::env::temp_dir().join(format!("phantom_viewer_decode_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let wide = dir.join("wide.png");
        image::RgbaImage::new(9, 1)
            .save_with_format(&wide, image::ImageFormat::Png)
            .unwrap();

        match decode_texture(&wide, 8) {
            Err(e @ ViewerError::TextureTooLarge { width: 9, height: 1, max: 8, .. }) => {
                assert!(e.to_string().ends_with("is 9x1, exceeds max texture size 8"), "{}", e);
            }
            other => panic!("expected TextureTooLarge, got {:?}", other.map(|i| (i.width, i.height))),
        }
        assert_eq!(decode_texture(&wide, 9).unwrap().width, 9);

        let _ = std::fs::remove_dir_all(dir);
    }
}
