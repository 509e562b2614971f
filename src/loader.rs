//! Decoded images and the loaders that produce them.

use std::io::Read;
use std::path::Path;

use crate::error::Result;
use crate::format::PixelFormat;
use crate::targa;
use crate::types::{CreateTextureInfo, TextureFiltering};

/// Pixels in CPU memory, ready to become a texture.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Image {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Layer count; 0 for a plain 2D image.
    pub depth: u32,
    /// Layout of `pixels`.
    pub format: PixelFormat,
    /// Whether a texture made from this image should get a mip chain.
    pub mipmaps: bool,
    /// Tightly packed rows, first row first.
    pub pixels: Vec<u8>,
}

impl Image {
    /// Texture options for uploading this image.
    ///
    /// Without mipmaps only one level is allocated and sampling is bilinear,
    /// so the texture is complete as uploaded.
    pub fn to_texture_info(&self) -> CreateTextureInfo {
        let base = CreateTextureInfo {
            width: self.width,
            height: self.height,
            format: self.format,
            pixels: self.pixels.clone(),
            ..CreateTextureInfo::default()
        };
        if self.mipmaps {
            base
        } else {
            CreateTextureInfo {
                mipmaps: false,
                levels: 1,
                filter: TextureFiltering::Bilinear,
                ..base
            }
        }
    }
}

/// Read a whole Targa stream.
///
/// # Errors
///
/// Fails on I/O errors and on anything [`targa::decode`] rejects.
pub fn load_targa<R: Read>(mut reader: R) -> Result<Image> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    targa::decode(&bytes)
}

/// Read a Targa file from disk.
///
/// # Errors
///
/// Fails if the file cannot be read or does not decode.
pub fn load_targa_file(path: impl AsRef<Path>) -> Result<Image> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let image = targa::decode(&bytes)?;
    log::debug!(
        target: "gl",
        "Loaded {} ({}x{} {:?})",
        path.display(),
        image.width,
        image.height,
        image.format
    );
    Ok(image)
}

/// Decode a PNG or JPEG image into RGBA8.
///
/// # Errors
///
/// Returns [`Error::Decode`](crate::Error::Decode) if the bytes are not a
/// supported image.
pub fn load_image(bytes: &[u8]) -> Result<Image> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Image {
        width,
        height,
        depth: 0,
        format: PixelFormat::Rgba8,
        mipmaps: true,
        pixels: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::error::Error;

    fn bgr_image() -> Image {
        Image {
            width: 2,
            height: 1,
            depth: 0,
            format: PixelFormat::Bgr8,
            mipmaps: false,
            pixels: vec![1, 2, 3, 4, 5, 6],
        }
    }

    #[test]
    fn load_targa_reads_from_any_reader() {
        let bytes = targa::encode(&bgr_image(), false);
        assert!(bytes.is_ok());
        let loaded = bytes.and_then(|b| load_targa(Cursor::new(b)));
        assert_eq!(loaded.ok(), Some(bgr_image()));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = load_targa_file("/nonexistent/texture.tga");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn png_decodes_to_rgba8() {
        let mut png = Vec::new();
        let source = image::RgbImage::from_raw(2, 1, vec![255, 0, 0, 0, 255, 0]);
        assert!(source.is_some());
        if let Some(source) = source {
            let written = source.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png);
            assert!(written.is_ok());
        }

        let decoded = load_image(&png);
        assert!(decoded.is_ok());
        if let Ok(decoded) = decoded {
            assert_eq!(decoded.format, PixelFormat::Rgba8);
            assert_eq!((decoded.width, decoded.height), (2, 1));
            assert_eq!(decoded.pixels, [255, 0, 0, 255, 0, 255, 0, 255]);
        }
    }

    #[test]
    fn garbage_is_decode_error() {
        assert!(matches!(load_image(b"not an image"), Err(Error::Decode(_))));
    }

    #[test]
    fn texture_info_without_mipmaps_is_single_level() {
        let info = bgr_image().to_texture_info();
        assert_eq!(info.levels, 1);
        assert!(!info.mipmaps);
        assert_eq!(info.filter, TextureFiltering::Bilinear);
        assert_eq!(info.pixels, bgr_image().pixels);

        let mipmapped = Image {
            mipmaps: true,
            ..bgr_image()
        }
        .to_texture_info();
        assert_eq!(mipmapped.levels, 4);
        assert_eq!(mipmapped.filter, TextureFiltering::Trilinear);
    }
}
