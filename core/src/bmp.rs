//! Uncompressed 24-bit Windows bitmaps, composited straight from the
//! downloaded bytes into the packed 4-bit framebuffer.
//!
//! Only the handful of header fields needed for that are read, always from
//! their fixed offsets. Palettes, compression and other bit depths are not
//! supported; callers route such images elsewhere.

use core::fmt;

use log::{debug, info, warn};
use zerocopy::byteorder::little_endian::{I32, U16, U32};

use crate::framebuffer::set_packed_pixel;

pub const BMP_SIGNATURE: &[u8; 2] = b"BM";
pub const FILE_HEADER_SIZE: usize = 14;
const SUPPORTED_BITS_PER_PIXEL: u16 = 24;

/// File header plus the leading fields of the info header, as stored.
#[repr(C)]
#[derive(zerocopy::FromBytes)]
struct RawHeader {
    signature: [u8; 2],
    file_size: U32,
    _reserved: [u8; 4],
    data_offset: U32,
    _info_header_size: U32,
    width: I32,
    height: I32,
    _planes: U16,
    bits_per_pixel: U16,
}

pub const HEADER_PREFIX_SIZE: usize = core::mem::size_of::<RawHeader>();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmpError {
    /// The buffer does not start with `BM`.
    InvalidSignature,
    /// The buffer ends before the header fields.
    TruncatedHeader,
    /// Anything other than 24 bits per pixel.
    UnsupportedPixelFormat(u16),
}

impl fmt::Display for BmpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BmpError::InvalidSignature => f.write_str("not a BMP file"),
            BmpError::TruncatedHeader => f.write_str("BMP header is truncated"),
            BmpError::UnsupportedPixelFormat(bpp) => {
                write!(f, "only 24bpp BMP supported, got {bpp}bpp")
            }
        }
    }
}

impl core::error::Error for BmpError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    TopDown,
    BottomUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpHeader {
    pub file_size: u32,
    pub data_offset: u32,
    pub width: i32,
    pub height: i32,
    pub bits_per_pixel: u16,
}

impl BmpHeader {
    /// Reads the header fields without validating the pixel format.
    pub fn read(raw: &[u8]) -> Result<Self, BmpError> {
        if raw.get(..2) != Some(&BMP_SIGNATURE[..]) {
            return Err(BmpError::InvalidSignature);
        }
        let (header, _) = <RawHeader as zerocopy::FromBytes>::read_from_prefix(raw)
            .map_err(|_| BmpError::TruncatedHeader)?;
        Ok(Self {
            file_size: header.file_size.get(),
            data_offset: header.data_offset.get(),
            width: header.width.get(),
            height: header.height.get(),
            bits_per_pixel: header.bits_per_pixel.get(),
        })
    }

    /// Reads the header and checks that the pixels are 24-bit BGR.
    pub fn parse(raw: &[u8]) -> Result<Self, BmpError> {
        let header = Self::read(raw)?;
        if header.bits_per_pixel != SUPPORTED_BITS_PER_PIXEL {
            return Err(BmpError::UnsupportedPixelFormat(header.bits_per_pixel));
        }
        Ok(header)
    }

    pub fn row_order(&self) -> RowOrder {
        if self.height < 0 {
            RowOrder::TopDown
        } else {
            RowOrder::BottomUp
        }
    }

    /// Width in pixels; a negative width is treated as empty.
    pub fn columns(&self) -> usize {
        self.width.max(0) as usize
    }

    pub fn rows(&self) -> usize {
        self.height.unsigned_abs() as usize
    }

    /// Bytes per stored row, padded to a multiple of four.
    pub fn row_stride(&self) -> u64 {
        (self.columns() as u64 * 3).div_ceil(4) * 4
    }

    /// Stored row index holding visual row `y`, counted from the top.
    pub fn source_row(&self, y: usize) -> usize {
        match self.row_order() {
            RowOrder::TopDown => y,
            RowOrder::BottomUp => self.rows() - 1 - y,
        }
    }
}

/// Luminance of an RGB triple, truncated to 8 bits.
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 30 + g as u32 * 59 + b as u32 * 11) / 100) as u8
}

/// Rescales 0..=255 to 0..=15, rounding to the nearest level.
pub fn gray4(gray8: u8) -> u8 {
    ((gray8 as u32 * 15 + 127) / 255) as u8
}

pub fn rgb_to_gray4(r: u8, g: u8, b: u8) -> u8 {
    gray4(luminance(r, g, b))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompositeStats {
    pub rows: usize,
    pub pixels_written: usize,
    /// Pixels whose bytes lie beyond the end of the buffer.
    pub pixels_truncated: usize,
    /// Pixels whose target lies beyond the end of the framebuffer slice.
    pub pixels_clipped: usize,
}

/// Composites a 24-bit BMP into a packed 4-bit framebuffer, `y_offset` rows
/// below the top.
///
/// The header is validated before anything is written. Afterwards the image
/// is drawn best-effort: rows and columns outside the framebuffer and pixels
/// missing from a short buffer are skipped rather than reported.
pub fn composite_bitmap(
    raw: &[u8],
    framebuffer: &mut [u8],
    framebuffer_width: usize,
    framebuffer_height: usize,
    y_offset: usize,
) -> Result<CompositeStats, BmpError> {
    let header = BmpHeader::parse(raw)?;
    debug!(
        "BMP header: {}x{}, data at {}, {:?}",
        header.width,
        header.height,
        header.data_offset,
        header.row_order()
    );

    let len = raw.len() as u64;
    let stride = header.row_stride();
    let rows = header
        .rows()
        .min(framebuffer_height.saturating_sub(y_offset));
    let columns = header.columns().min(framebuffer_width);
    if header.data_offset as u64 >= len {
        warn!("BMP pixel data starts past the end of the buffer");
    }

    let mut stats = CompositeStats {
        rows,
        ..Default::default()
    };
    for y in 0..rows {
        let row_start = header.data_offset as u64 + header.source_row(y) as u64 * stride;
        let row_index = (y + y_offset) * framebuffer_width;

        for x in 0..columns {
            let offset = row_start + x as u64 * 3;
            if offset + 2 >= len {
                stats.pixels_truncated += 1;
                continue;
            }
            let offset = offset as usize;
            let (b, g, r) = (raw[offset], raw[offset + 1], raw[offset + 2]);

            if set_packed_pixel(framebuffer, row_index + x, rgb_to_gray4(r, g, b)) {
                stats.pixels_written += 1;
            } else {
                stats.pixels_clipped += 1;
            }
        }
    }

    if stats.pixels_truncated > 0 {
        warn!(
            "BMP data is short, skipped {} pixels",
            stats.pixels_truncated
        );
    }
    info!(
        "BMP parsed and framebuffer filled: {} rows, {} pixels",
        stats.rows, stats.pixels_written
    );
    Ok(stats)
}
