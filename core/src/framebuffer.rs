use alloc::{boxed::Box, vec};
use embedded_graphics::{
    Pixel,
    pixelcolor::{Gray4, GrayColor},
    prelude::{DrawTarget, OriginDimensions, Size},
};

use crate::bmp::{self, BmpError, CompositeStats};

pub const WIDTH: usize = 960;
pub const HEIGHT: usize = 540;
pub const BUFFER_SIZE: usize = WIDTH * HEIGHT / 2;

/// Two white pixels.
pub const BLANK: u8 = 0xFF;

/// Writes a 4-bit value into a buffer holding two pixels per byte.
///
/// Even pixel indices live in the high nibble, odd ones in the low nibble.
/// The neighbouring nibble is preserved. Returns `false` without touching the
/// buffer when the index falls outside of it.
pub fn set_packed_pixel(buffer: &mut [u8], index: usize, value: u8) -> bool {
    let Some(byte) = buffer.get_mut(index / 2) else {
        return false;
    };
    let value = value & 0x0F;
    if index % 2 == 0 {
        *byte = (*byte & 0x0F) | (value << 4);
    } else {
        *byte = (*byte & 0xF0) | value;
    }
    true
}

pub fn packed_pixel(buffer: &[u8], index: usize) -> Option<u8> {
    let byte = *buffer.get(index / 2)?;
    Some(if index % 2 == 0 { byte >> 4 } else { byte & 0x0F })
}

/// The panel framebuffer, 4-bit grayscale, row-major.
///
/// Allocated once on the heap (PSRAM on the device) and cleared before every
/// render cycle.
pub struct Framebuffer {
    buffer: Box<[u8]>,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    pub fn new() -> Self {
        Self {
            buffer: vec![BLANK; BUFFER_SIZE].into_boxed_slice(),
        }
    }

    pub fn clear(&mut self) {
        self.buffer.fill(BLANK);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        if x >= WIDTH || y >= HEIGHT {
            return None;
        }
        packed_pixel(&self.buffer, y * WIDTH + x)
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, value: u8) {
        if x < 0 || y < 0 || x as usize >= WIDTH || y as usize >= HEIGHT {
            return;
        }
        set_packed_pixel(&mut self.buffer, y as usize * WIDTH + x as usize, value);
    }

    /// Composites a 24-bit BMP into the panel area starting `y_offset` rows
    /// from the top.
    pub fn composite_bmp(
        &mut self,
        raw: &[u8],
        y_offset: usize,
    ) -> Result<CompositeStats, BmpError> {
        bmp::composite_bitmap(raw, &mut self.buffer, WIDTH, HEIGHT, y_offset)
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for Framebuffer {
    type Color = Gray4;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            self.set_pixel(coord.x, coord.y, color.luma());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let luma = color.luma();
        self.buffer.fill((luma << 4) | luma);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use embedded_graphics::{
        Drawable,
        prelude::{Point, Primitive},
        primitives::{Line, PrimitiveStyle},
    };

    #[test]
    fn new_buffer_is_white() {
        let fb = Framebuffer::new();
        assert_eq!(fb.as_bytes().len(), BUFFER_SIZE);
        assert!(fb.as_bytes().iter().all(|&b| b == BLANK));
        assert_eq!(fb.pixel(0, 0), Some(15));
    }

    #[test]
    fn packed_pixel_nibble_order() {
        let mut buffer = [0x00u8; 2];
        assert!(set_packed_pixel(&mut buffer, 0, 0xA));
        assert_eq!(buffer, [0xA0, 0x00]);
        assert!(set_packed_pixel(&mut buffer, 1, 0x5));
        assert_eq!(buffer, [0xA5, 0x00]);
        assert!(set_packed_pixel(&mut buffer, 3, 0xFF));
        assert_eq!(buffer, [0xA5, 0x0F]);
        assert_eq!(packed_pixel(&buffer, 0), Some(0xA));
        assert_eq!(packed_pixel(&buffer, 1), Some(0x5));
    }

    #[test]
    fn packed_pixel_out_of_range() {
        let mut buffer = [0x12u8; 2];
        assert!(!set_packed_pixel(&mut buffer, 4, 0));
        assert!(!set_packed_pixel(&mut buffer, usize::MAX, 0));
        assert_eq!(buffer, [0x12, 0x12]);
        assert_eq!(packed_pixel(&buffer, 4), None);
    }

    #[test]
    fn set_pixel_clips() {
        let mut fb = Framebuffer::new();
        fb.set_pixel(-1, 0, 0);
        fb.set_pixel(0, -1, 0);
        fb.set_pixel(WIDTH as i32, 0, 0);
        fb.set_pixel(0, HEIGHT as i32, 0);
        assert!(fb.as_bytes().iter().all(|&b| b == BLANK));

        fb.set_pixel(WIDTH as i32 - 1, HEIGHT as i32 - 1, 3);
        assert_eq!(fb.pixel(WIDTH - 1, HEIGHT - 1), Some(3));
        assert_eq!(fb.as_bytes()[BUFFER_SIZE - 1], 0xF3);
    }

    #[test]
    fn draw_target_writes_gray4() {
        let mut fb = Framebuffer::new();
        Line::new(Point::new(0, 5), Point::new(9, 5))
            .into_styled(PrimitiveStyle::with_stroke(Gray4::new(7), 1))
            .draw(&mut fb)
            .ok();
        for x in 0..10 {
            assert_eq!(fb.pixel(x, 5), Some(7));
        }
        assert_eq!(fb.pixel(10, 5), Some(15));
        assert_eq!(fb.pixel(0, 4), Some(15));

        fb.clear();
        assert_eq!(fb.pixel(3, 5), Some(15));
    }

    #[test]
    fn draw_target_clear_fills_both_nibbles() {
        let mut fb = Framebuffer::new();
        DrawTarget::clear(&mut fb, Gray4::new(2)).ok();
        assert!(fb.as_bytes().iter().all(|&b| b == 0x22));
    }
}
