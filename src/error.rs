//! Error type shared by the factories and the image loaders.
//!
//! The dispatch path never produces errors; see [`present`](crate::present).

use thiserror::Error;

use crate::format::PixelFormat;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong outside of command replay.
#[derive(Debug, Error)]
pub enum Error {
    /// The driver rejected a shader stage. Carries the compiler log.
    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    /// Linking a program from compiled stages failed.
    #[error("program link failed: {0}")]
    ProgramLink(String),

    /// The driver could not allocate a resource object.
    #[error("failed to create {kind}: {reason}")]
    ResourceCreation {
        /// Resource kind, e.g. `"texture"`.
        kind: &'static str,
        /// Driver-supplied reason.
        reason: String,
    },

    /// The Targa data type is not one of truecolor, greyscale or RLE truecolor.
    #[error("unsupported targa data type {0}")]
    UnsupportedTarga(u8),

    /// The Targa stream ended before the header or all pixels were read.
    #[error("targa data truncated")]
    TruncatedTarga,

    /// A run-length packet would write past the end of the image.
    #[error("targa packet overruns image at pixel {0}")]
    CorruptTarga(usize),

    /// The image's pixel format has no Targa data type.
    #[error("pixel format {0:?} cannot be written as targa")]
    TargaFormat(PixelFormat),

    /// Reading an image file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Decoding a PNG/JPEG image failed.
    #[error(transparent)]
    Decode(#[from] image::ImageError),
}
