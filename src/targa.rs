//! Truevision Targa reading and writing.
//!
//! Only the data types the engine's own assets use are handled: raw
//! truecolor (2), raw greyscale (3) and run-length truecolor (10). Pixels are
//! kept in file order, which for the default bottom-left origin is already
//! the row order GL expects.

use crate::error::{Error, Result};
use crate::format::PixelFormat;
use crate::loader::Image;

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 18;

const TRUE_COLOR: u8 = 2;
const GREYSCALE: u8 = 3;
const RLE_TRUE_COLOR: u8 = 10;

/// Longest run or literal packet.
const MAX_PACKET: usize = 128;
const RUN_FLAG: u8 = 0x80;

/// The fixed 18-byte header, all fields little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TargaHeader {
    /// Length of the image ID field following the header.
    pub id_length: u8,
    /// Non-zero when a color map is present.
    pub color_map_type: u8,
    /// Image data type: 2 truecolor, 3 greyscale, 10 RLE truecolor.
    pub data_type: u8,
    /// First color-map entry.
    pub color_map_index: u16,
    /// Color-map entries.
    pub color_map_length: u16,
    /// Bits per color-map entry.
    pub color_map_entry_size: u8,
    /// Horizontal origin.
    pub x: u16,
    /// Vertical origin.
    pub y: u16,
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// Bits per pixel.
    pub bpp: u8,
    /// Alpha bit count in the low nibble, origin flags above.
    pub descriptor: u8,
}

impl TargaHeader {
    /// Parse the header at the start of `bytes`.
    ///
    /// # Errors
    ///
    /// [`Error::TruncatedTarga`] if fewer than [`HEADER_LEN`] bytes are given.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let h: &[u8; HEADER_LEN] = bytes
            .get(..HEADER_LEN)
            .and_then(|h| h.try_into().ok())
            .ok_or(Error::TruncatedTarga)?;
        let word = |i: usize| u16::from_le_bytes([h[i], h[i + 1]]);
        Ok(Self {
            id_length: h[0],
            color_map_type: h[1],
            data_type: h[2],
            color_map_index: word(3),
            color_map_length: word(5),
            color_map_entry_size: h[7],
            x: word(8),
            y: word(10),
            width: word(12),
            height: word(14),
            bpp: h[16],
            descriptor: h[17],
        })
    }

    /// Serialize back into the on-disk layout.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut h = [0; HEADER_LEN];
        h[0] = self.id_length;
        h[1] = self.color_map_type;
        h[2] = self.data_type;
        h[3..5].copy_from_slice(&self.color_map_index.to_le_bytes());
        h[5..7].copy_from_slice(&self.color_map_length.to_le_bytes());
        h[7] = self.color_map_entry_size;
        h[8..10].copy_from_slice(&self.x.to_le_bytes());
        h[10..12].copy_from_slice(&self.y.to_le_bytes());
        h[12..14].copy_from_slice(&self.width.to_le_bytes());
        h[14..16].copy_from_slice(&self.height.to_le_bytes());
        h[16] = self.bpp;
        h[17] = self.descriptor;
        h
    }

    /// Pixel format for the bit depth: 8 → R8, 24 → BGR8, 32 → BGRA8.
    pub fn pixel_format(&self) -> PixelFormat {
        match self.bpp {
            8 => PixelFormat::R8,
            24 => PixelFormat::Bgr8,
            32 => PixelFormat::Bgra8,
            _ => PixelFormat::Unknown,
        }
    }

    fn color_map_bytes(&self) -> usize {
        if self.color_map_type == 0 {
            return 0;
        }
        usize::from(self.color_map_length) * usize::from(self.color_map_entry_size).div_ceil(8)
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(Error::TruncatedTarga)?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn byte(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }
}

/// Decode a complete Targa file.
///
/// Bit depths other than 8, 24 and 32 still decode, with an
/// [`PixelFormat::Unknown`] format.
///
/// # Errors
///
/// - [`Error::UnsupportedTarga`] for color-mapped or other RLE data types.
/// - [`Error::TruncatedTarga`] if the data ends early.
/// - [`Error::CorruptTarga`] if a packet runs past the last pixel.
pub fn decode(bytes: &[u8]) -> Result<Image> {
    let header = TargaHeader::parse(bytes)?;
    if !matches!(header.data_type, TRUE_COLOR | GREYSCALE | RLE_TRUE_COLOR) {
        return Err(Error::UnsupportedTarga(header.data_type));
    }

    let mut reader = Reader {
        bytes,
        pos: HEADER_LEN,
    };
    reader.take(usize::from(header.id_length))?;
    reader.take(header.color_map_bytes())?;

    let bytes_per_pixel = usize::from(header.bpp / 8);
    let pixel_count = usize::from(header.width) * usize::from(header.height);
    let pixels = if header.data_type == RLE_TRUE_COLOR {
        decode_rle(&mut reader, pixel_count, bytes_per_pixel)?
    } else {
        reader.take(pixel_count.saturating_mul(bytes_per_pixel))?.to_vec()
    };

    Ok(Image {
        width: u32::from(header.width),
        height: u32::from(header.height),
        depth: 0,
        format: header.pixel_format(),
        mipmaps: false,
        pixels,
    })
}

fn decode_rle(reader: &mut Reader<'_>, pixel_count: usize, bytes_per_pixel: usize) -> Result<Vec<u8>> {
    // A packet is at least one control byte plus one pixel and expands to at
    // most MAX_PACKET pixels, so the input bounds the output size.
    let packets = reader.remaining() / (bytes_per_pixel + 1);
    let capacity = pixel_count
        .saturating_mul(bytes_per_pixel)
        .min(packets.saturating_mul(MAX_PACKET * bytes_per_pixel));
    let mut pixels = Vec::with_capacity(capacity);
    let mut decoded = 0;
    while decoded < pixel_count {
        let control = reader.byte()?;
        let count = usize::from(control & !RUN_FLAG) + 1;
        if decoded + count > pixel_count {
            return Err(Error::CorruptTarga(decoded));
        }
        if control & RUN_FLAG == 0 {
            pixels.extend_from_slice(reader.take(count * bytes_per_pixel)?);
        } else {
            let pixel = reader.take(bytes_per_pixel)?;
            for _ in 0..count {
                pixels.extend_from_slice(pixel);
            }
        }
        decoded += count;
    }
    Ok(pixels)
}

/// Encode an image as Targa.
///
/// BGR8 and BGRA8 images are written as truecolor, run-length encoded when
/// `rle` is set. R8 images are always written as raw greyscale.
///
/// # Errors
///
/// - [`Error::TargaFormat`] for any other pixel format, or dimensions that
///   do not fit the 16-bit header fields.
/// - [`Error::TruncatedTarga`] if `image.pixels` is shorter than the image.
pub fn encode(image: &Image, rle: bool) -> Result<Vec<u8>> {
    let (bpp, alpha_bits, data_type) = match image.format {
        PixelFormat::R8 => (8, 0, GREYSCALE),
        PixelFormat::Bgr8 => (24, 0, if rle { RLE_TRUE_COLOR } else { TRUE_COLOR }),
        PixelFormat::Bgra8 => (32, 8, if rle { RLE_TRUE_COLOR } else { TRUE_COLOR }),
        other => return Err(Error::TargaFormat(other)),
    };
    let (Ok(width), Ok(height)) = (u16::try_from(image.width), u16::try_from(image.height)) else {
        return Err(Error::TargaFormat(image.format));
    };

    let bytes_per_pixel = usize::from(bpp / 8);
    let len = usize::from(width) * usize::from(height) * bytes_per_pixel;
    let pixels = image.pixels.get(..len).ok_or(Error::TruncatedTarga)?;

    let header = TargaHeader {
        data_type,
        width,
        height,
        bpp,
        descriptor: alpha_bits,
        ..TargaHeader::default()
    };

    let mut out = Vec::with_capacity(HEADER_LEN + len);
    out.extend_from_slice(&header.to_bytes());
    if data_type == RLE_TRUE_COLOR {
        encode_rle(&mut out, pixels, bytes_per_pixel);
    } else {
        out.extend_from_slice(pixels);
    }
    Ok(out)
}

#[allow(clippy::cast_possible_truncation)]
fn encode_rle(out: &mut Vec<u8>, pixels: &[u8], bytes_per_pixel: usize) {
    let pixels: Vec<&[u8]> = pixels.chunks_exact(bytes_per_pixel).collect();
    let run_length = |start: usize| {
        pixels[start..]
            .iter()
            .take(MAX_PACKET)
            .take_while(|p| **p == pixels[start])
            .count()
    };

    let mut i = 0;
    while i < pixels.len() {
        let run = run_length(i);
        if run > 1 {
            out.push(RUN_FLAG | (run - 1) as u8);
            out.extend_from_slice(pixels[i]);
            i += run;
            continue;
        }

        let start = i;
        while i < pixels.len() && i - start < MAX_PACKET && (i == start || run_length(i) < 2) {
            i += 1;
        }
        out.push((i - start - 1) as u8);
        for pixel in &pixels[start..i] {
            out.extend_from_slice(pixel);
        }
    }
}
