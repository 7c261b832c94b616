use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use argh::FromArgs;
use inkframe_core::{
    application::Application,
    battery::{self, ChargeState},
    config::{ImageFormat, Settings},
    display::Display,
    framebuffer::Framebuffer,
    telemetry::Climate,
};
use log::{info, warn};

use crate::host_board::HostBoard;
use crate::jpeg::ImageJpegDecoder;
use crate::local_net::LocalNetwork;
use crate::minifb_display::MinifbDisplay;
use crate::png_display::PngDisplay;

mod host_board;
mod jpeg;
mod local_net;
mod minifb_display;
mod png_display;

#[derive(FromArgs)]
/// Runs the frame's wake cycle against a local directory
struct Args {
    /// directory standing in for the image server
    #[argh(option, default = "PathBuf::from(\".\")")]
    root: PathBuf,

    /// image URL, its path is resolved below the root
    #[argh(option, default = "String::from(\"http://localhost/frame.bmp\")")]
    url: String,

    /// image format, bmp or jpg
    #[argh(option, default = "ImageFormat::Bmp", from_str_fn(parse_format))]
    format: ImageFormat,

    /// telemetry URL
    #[argh(option, default = "String::from(\"http://localhost/sensor.php\")")]
    telemetry_url: String,

    /// also write every refresh to this PNG file
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// no preview window
    #[argh(switch)]
    headless: bool,

    /// leave the top band to the image
    #[argh(switch)]
    no_status_bar: bool,

    /// simulate a missing access point
    #[argh(switch)]
    offline: bool,

    /// battery voltage reported by the board
    #[argh(option, default = "4.0")]
    battery: f32,

    /// raw 12-bit reading of the battery sense pin, overrides --battery
    #[argh(option)]
    battery_adc: Option<u16>,

    /// room temperature, enables the climate sensor
    #[argh(option)]
    temperature: Option<f32>,

    /// relative humidity for the climate sensor
    #[argh(option, default = "50.0")]
    humidity: f32,

    /// signal strength in dBm
    #[argh(option, default = "-55")]
    rssi: i32,

    /// wake-up period in minutes
    #[argh(option, default = "60")]
    sleep_minutes: u32,

    /// keep waking up instead of exiting after one cycle
    #[argh(switch)]
    repeat: bool,
}

fn parse_format(value: &str) -> Result<ImageFormat, String> {
    value
        .parse()
        .map_err(|_| format!("unknown image format {value:?}, expected bmp or jpg"))
}

/// Every refresh goes to the preview window and/or a PNG file.
struct Panels {
    window: Option<MinifbDisplay>,
    file: Option<PngDisplay>,
}

impl Panels {
    fn each(&mut self, mut f: impl FnMut(&mut dyn Display)) {
        if let Some(window) = &mut self.window {
            f(window);
        }
        if let Some(file) = &mut self.file {
            f(file);
        }
    }

    /// Waits for `duration`, or until the window is closed when `None`.
    /// Returns `false` once the window has been closed.
    fn idle(&mut self, duration: Option<Duration>) -> bool {
        let deadline = duration.map(|d| Instant::now() + d);
        match &mut self.window {
            Some(window) => {
                while window.is_open() {
                    if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                        return true;
                    }
                    window.update();
                    thread::sleep(Duration::from_millis(100));
                }
                false
            }
            None => {
                if let Some(duration) = duration {
                    thread::sleep(duration);
                }
                true
            }
        }
    }
}

impl Display for Panels {
    fn power_on(&mut self) {
        self.each(|d| d.power_on());
    }

    fn clear(&mut self) {
        self.each(|d| d.clear());
    }

    fn draw_grayscale(&mut self, framebuffer: &Framebuffer) {
        self.each(|d| d.draw_grayscale(framebuffer));
    }

    fn power_off(&mut self) {
        self.each(|d| d.power_off());
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();
    info!(
        "Inkframe desktop simulator started, {} images from {}",
        args.format.label(),
        args.url
    );

    let settings = Settings {
        image_url: &args.url,
        image_format: args.format,
        telemetry_url: &args.telemetry_url,
        enable_climate_sensor: args.temperature.is_some(),
        enable_status_bar: !args.no_status_bar,
        sleep_minutes: args.sleep_minutes,
        ..Settings::DEFAULT
    };
    let climate = args.temperature.map(|temperature| Climate {
        temperature,
        humidity: args.humidity,
    });

    let mut net = LocalNetwork::new(args.root.clone(), args.rssi);
    net.set_offline(args.offline);
    let battery_voltage = match args.battery_adc {
        Some(raw) => battery::adc_to_voltage(raw, battery::DEFAULT_VREF_MV),
        None => args.battery,
    };
    let mut board = HostBoard::new(battery_voltage, climate);
    let mut decoder = ImageJpegDecoder;
    let mut panels = Panels {
        window: (!args.headless).then(MinifbDisplay::default),
        file: args.output.clone().map(PngDisplay::new),
    };
    if panels.window.is_none() && panels.file.is_none() {
        warn!("Headless without --output, frames are not kept");
    }

    let mut framebuffer = Box::new(Framebuffer::new());
    let mut application = Application::new(settings, &mut framebuffer);

    loop {
        let report = application.run_cycle(&mut net, &mut board, &mut decoder, &mut panels);
        info!(
            "{:?} from {:?}, battery {:.2} V ({})",
            report.outcome,
            net.root(),
            report.battery_voltage,
            ChargeState::from_voltage(report.battery_voltage, false).format()
        );

        if !args.repeat {
            panels.idle(None);
            break;
        }
        if !panels.idle(Some(Duration::from_secs(report.sleep_seconds as u64))) {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, argh::EarlyExit> {
        Args::from_args(&["inkframe-desktop"], args)
    }

    #[test]
    fn format_flag() {
        let args = parse(&["--format", "jpg"]).unwrap();
        assert_eq!(args.format, ImageFormat::Jpeg);
        let args = parse(&["--format", "BMP"]).unwrap();
        assert_eq!(args.format, ImageFormat::Bmp);
        assert!(parse(&["--format", "png"]).is_err());
    }

    #[test]
    fn defaults() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.format, ImageFormat::Bmp);
        assert_eq!(args.sleep_minutes, 60);
        assert_eq!(args.battery_adc, None);
        assert!(!args.repeat);
    }

    #[test]
    fn format_error_names_choices() {
        let message = parse_format("gif").unwrap_err();
        assert!(message.contains("expected bmp or jpg"));
    }
}
