use std::path::PathBuf;

use image::{GrayImage, Luma};
use inkframe_core::{
    display::Display,
    framebuffer::{Framebuffer, HEIGHT, WIDTH},
};
use log::{error, info};

/// Writes every refresh to a PNG file instead of a panel.
pub struct PngDisplay {
    path: PathBuf,
}

impl PngDisplay {
    pub fn new(path: PathBuf) -> Self {
        PngDisplay { path }
    }
}

pub fn to_gray_image(framebuffer: &Framebuffer) -> GrayImage {
    GrayImage::from_fn(WIDTH as u32, HEIGHT as u32, |x, y| {
        let level = framebuffer.pixel(x as usize, y as usize).unwrap_or(0x0F);
        Luma([level * 17])
    })
}

impl Display for PngDisplay {
    fn power_on(&mut self) {}

    fn clear(&mut self) {}

    fn draw_grayscale(&mut self, framebuffer: &Framebuffer) {
        match to_gray_image(framebuffer).save(&self.path) {
            Ok(()) => info!("Frame written to {:?}", self.path),
            Err(e) => error!("Writing {:?} failed: {e}", self.path),
        }
    }

    fn power_off(&mut self) {}
}
