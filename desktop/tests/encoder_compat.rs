use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};
use inkframe_core::{
    bmp::{BmpHeader, RowOrder, rgb_to_gray4},
    config::STATUS_BAR_HEIGHT,
    framebuffer::{Framebuffer, WIDTH},
};

fn encode_bmp(image: &RgbImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Bmp).unwrap();
    out.into_inner()
}

/// Four horizontal bands, distinct gray levels from top to bottom.
fn banded(width: u32, height: u32) -> RgbImage {
    const BANDS: [[u8; 3]; 4] = [[0, 0, 0], [255, 0, 0], [0, 0, 255], [255, 255, 255]];
    RgbImage::from_fn(width, height, |_, y| Rgb(BANDS[(y * 4 / height) as usize]))
}

#[test]
fn encoder_writes_bottom_up_24bit() {
    let data = encode_bmp(&banded(7, 8));
    let header = BmpHeader::parse(&data).unwrap();
    assert_eq!(header.bits_per_pixel, 24);
    assert_eq!(header.row_order(), RowOrder::BottomUp);
    assert_eq!(header.columns(), 7);
    assert_eq!(header.rows(), 8);
    assert_eq!(header.file_size as usize, data.len());
}

#[test]
fn encoded_rows_land_top_to_bottom() {
    let image = banded(7, 8);
    let data = encode_bmp(&image);
    let mut fb = Framebuffer::new();
    let stats = fb.composite_bmp(&data, STATUS_BAR_HEIGHT).unwrap();
    assert_eq!(stats.pixels_written, 7 * 8);
    assert_eq!(stats.pixels_truncated, 0);

    for y in 0..8 {
        let Rgb([r, g, b]) = *image.get_pixel(0, y);
        let expected = rgb_to_gray4(r, g, b);
        for x in 0..7 {
            assert_eq!(
                fb.pixel(x, STATUS_BAR_HEIGHT + y as usize),
                Some(expected),
                "pixel {x},{y}"
            );
        }
        assert_eq!(fb.pixel(7, STATUS_BAR_HEIGHT + y as usize), Some(15));
    }
    assert_eq!(fb.pixel(0, STATUS_BAR_HEIGHT - 1), Some(15));
}

#[test]
fn full_panel_image_is_clipped_to_panel() {
    let image = RgbImage::from_pixel(WIDTH as u32 + 40, 540, Rgb([0, 0, 0]));
    let data = encode_bmp(&image);
    let mut fb = Framebuffer::new();
    let stats = fb.composite_bmp(&data, STATUS_BAR_HEIGHT).unwrap();
    assert_eq!(stats.rows, 540 - STATUS_BAR_HEIGHT);
    assert_eq!(stats.pixels_written, WIDTH * (540 - STATUS_BAR_HEIGHT));
    assert_eq!(fb.pixel(0, 0), Some(15));
    assert_eq!(fb.pixel(WIDTH - 1, 539), Some(0));
}
