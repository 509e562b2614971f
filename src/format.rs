//! Pixel formats and their mapping onto GL texture format triples.

/// Closed set of pixel layouts understood by the texture and renderbuffer
/// factories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    /// No known layout. Factories refuse to allocate with it.
    #[default]
    Unknown,
    /// One 8-bit channel.
    R8,
    /// Two 8-bit channels.
    Rg8,
    /// 8-bit RGB.
    Rgb8,
    /// 8-bit RGBA.
    Rgba8,
    /// 8-bit RGB stored blue first.
    Bgr8,
    /// 8-bit RGBA stored blue first.
    Bgra8,
    /// One half-float channel.
    R16f,
    /// One 32-bit float channel.
    R32f,
    /// Half-float RGB.
    Rgb16f,
    /// Half-float RGBA.
    Rgba16f,
    /// 32-bit float RGB.
    Rgb32f,
    /// 32-bit float RGBA.
    Rgba32f,
    /// 32-bit float depth.
    Depth,
}

/// The three GL enums a texture upload needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureFormat {
    /// Sized internal format used for storage allocation.
    pub internal: u32,
    /// Client pixel layout (`RGB`, `BGRA`, ...).
    pub format: u32,
    /// Client component type (`UNSIGNED_BYTE`, `HALF_FLOAT`, `FLOAT`).
    pub ty: u32,
}

impl TextureFormat {
    const fn new(internal: u32, format: u32, ty: u32) -> Self {
        Self {
            internal,
            format,
            ty,
        }
    }
}

impl PixelFormat {
    /// Map to a GL format triple. `None` only for [`PixelFormat::Unknown`].
    pub fn texture_format(self) -> Option<TextureFormat> {
        let f = match self {
            PixelFormat::Unknown => return None,
            PixelFormat::R8 => TextureFormat::new(glow::R8, glow::RED, glow::UNSIGNED_BYTE),
            PixelFormat::Rg8 => TextureFormat::new(glow::RG8, glow::RG, glow::UNSIGNED_BYTE),
            PixelFormat::Rgb8 => TextureFormat::new(glow::RGB8, glow::RGB, glow::UNSIGNED_BYTE),
            PixelFormat::Rgba8 => TextureFormat::new(glow::RGBA8, glow::RGBA, glow::UNSIGNED_BYTE),
            PixelFormat::Bgr8 => TextureFormat::new(glow::RGB8, glow::BGR, glow::UNSIGNED_BYTE),
            PixelFormat::Bgra8 => TextureFormat::new(glow::RGBA8, glow::BGRA, glow::UNSIGNED_BYTE),
            PixelFormat::R16f => TextureFormat::new(glow::R16F, glow::RED, glow::HALF_FLOAT),
            PixelFormat::R32f => TextureFormat::new(glow::R32F, glow::RED, glow::FLOAT),
            PixelFormat::Rgb16f => TextureFormat::new(glow::RGB16F, glow::RGB, glow::HALF_FLOAT),
            PixelFormat::Rgba16f => TextureFormat::new(glow::RGBA16F, glow::RGBA, glow::HALF_FLOAT),
            PixelFormat::Rgb32f => TextureFormat::new(glow::RGB32F, glow::RGB, glow::FLOAT),
            PixelFormat::Rgba32f => TextureFormat::new(glow::RGBA32F, glow::RGBA, glow::FLOAT),
            PixelFormat::Depth => TextureFormat::new(
                glow::DEPTH_COMPONENT32F,
                glow::DEPTH_COMPONENT,
                glow::FLOAT,
            ),
        };
        Some(f)
    }

    /// Size of one client-side pixel in bytes. `0` for `Unknown`.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Unknown => 0,
            PixelFormat::R8 => 1,
            PixelFormat::Rg8 | PixelFormat::R16f => 2,
            PixelFormat::Rgb8 | PixelFormat::Bgr8 => 3,
            PixelFormat::Rgba8 | PixelFormat::Bgra8 | PixelFormat::R32f | PixelFormat::Depth => 4,
            PixelFormat::Rgb16f => 6,
            PixelFormat::Rgba16f => 8,
            PixelFormat::Rgb32f => 12,
            PixelFormat::Rgba32f => 16,
        }
    }
}
