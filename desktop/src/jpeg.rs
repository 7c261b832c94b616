use image::ImageFormat;
use inkframe_core::{
    bmp::gray4,
    decoder::JpegDecoder,
    framebuffer::{Framebuffer, HEIGHT, WIDTH},
};
use log::debug;

/// Host replacement for the board's JPEG decoder.
#[derive(Default)]
pub struct ImageJpegDecoder;

impl JpegDecoder for ImageJpegDecoder {
    type Error = image::ImageError;

    fn decode(&mut self, data: &[u8], framebuffer: &mut Framebuffer) -> Result<(), Self::Error> {
        let image = image::load_from_memory_with_format(data, ImageFormat::Jpeg)?.into_luma8();
        debug!("JPEG {}x{}", image.width(), image.height());

        let width = (image.width() as usize).min(WIDTH);
        let height = (image.height() as usize).min(HEIGHT);
        for y in 0..height {
            for x in 0..width {
                let luma = image.get_pixel(x as u32, y as u32)[0];
                framebuffer.set_pixel(x as i32, y as i32, gray4(luma));
            }
        }
        Ok(())
    }
}
