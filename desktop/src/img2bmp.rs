use argh::FromArgs;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, imageops};
use inkframe_core::{
    config::STATUS_BAR_HEIGHT,
    framebuffer::{HEIGHT, WIDTH},
};

#[derive(FromArgs)]
/// Conversion options
struct Args {
    /// input image path
    #[argh(option, short = 'i')]
    input_path: String,

    /// output BMP file path
    #[argh(option, short = 'o')]
    output_path: String,

    /// use the whole panel, including the status bar band
    #[argh(switch, short = 'f')]
    full: bool,
}

/// Scales `image` to fit `width` x `height` and centers it on white.
fn fit_on_white(image: &DynamicImage, width: u32, height: u32) -> RgbImage {
    let scaled = image
        .resize(width, height, imageops::FilterType::Triangle)
        .into_rgb8();
    let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    let x = (width - scaled.width()) / 2;
    let y = (height - scaled.height()) / 2;
    imageops::overlay(&mut canvas, &scaled, x as i64, y as i64);
    canvas
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Args = argh::from_env();

    let image = image::open(&args.input_path).expect("Failed to open input image");
    let height = if args.full {
        HEIGHT
    } else {
        HEIGHT - STATUS_BAR_HEIGHT
    };
    log::info!(
        "Fitting {}x{} into {}x{}",
        image.width(),
        image.height(),
        WIDTH,
        height
    );

    fit_on_white(&image, WIDTH as u32, height as u32)
        .save_with_format(&args.output_path, ImageFormat::Bmp)
        .expect("Failed to write BMP file");
}
